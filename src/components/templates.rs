use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info, error};

use crate::errors::WikiError;
use crate::types::{IndexListing, Page};
use crate::utils::{escape_attr, escape_html};

/// Data a template is filled with
#[derive(Debug, Clone, Copy)]
pub enum TemplateData<'a> {
    Page(&'a Page),
    Index(&'a IndexListing),
}

impl TemplateData<'_> {
    /// HTML-escaped value for a `{{KEY}}` placeholder
    fn value(&self, key: &str) -> Option<String> {
        match (self, key) {
            (TemplateData::Page(page), "TITLE") => Some(escape_html(page.title.as_str())),
            (TemplateData::Page(page), "BODY") => {
                Some(escape_html(&String::from_utf8_lossy(&page.body)))
            }
            (TemplateData::Index(index), "TITLE") => Some(escape_html(&index.heading)),
            (TemplateData::Index(index), "TITLES") => Some(title_list_html(index)),
            _ => None,
        }
    }
}

fn title_list_html(index: &IndexListing) -> String {
    let mut html = String::new();
    for title in &index.titles {
        let href = format!("/view/{}", title);
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_attr(&href),
            escape_html(title.as_str())
        ));
    }
    html
}

/// Named HTML templates, loaded once at startup and read-only afterwards.
///
/// Templates use `{{KEY}}` placeholders. Substitution is a single pass, so a
/// page body that happens to contain `{{TITLE}}` is rendered literally.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, String>,
}

impl TemplateSet {
    /// Load every `*.html` file in `dir`, named by its file stem
    pub fn from_dir(dir: &Path) -> Result<Self, WikiError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            error!("Failed to read template directory {:?}: {}", dir, e);
            WikiError::Io(e)
        })?;

        let mut templates = HashMap::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read template {:?}: {}", path, e);
                WikiError::Io(e)
            })?;
            debug!("Loaded template '{}' from {:?}", name, path);
            templates.insert(name.to_string(), source);
        }

        info!("Loaded {} templates from {:?}", templates.len(), dir);
        Ok(Self { templates })
    }

    /// Build a set from in-memory `(name, source)` pairs
    pub fn from_sources<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: sources.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Fill the named template with `data`
    pub fn render(&self, name: &str, data: TemplateData<'_>) -> Result<String, WikiError> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| WikiError::TemplateError(format!("no template named {:?}", name)))?;

        let mut out = String::with_capacity(source.len());
        let mut rest = source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                WikiError::TemplateError(format!("{}: unterminated placeholder", name))
            })?;
            let key = after[..end].trim();
            let value = data.value(key).ok_or_else(|| {
                WikiError::TemplateError(format!("{}: unknown placeholder {:?}", name, key))
            })?;
            out.push_str(&value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Title;

    fn page(title: &str, body: &str) -> Page {
        Page::new(title.parse().unwrap(), body)
    }

    #[test]
    fn fills_page_placeholders() {
        let set = TemplateSet::from_sources([("view", "<h1>{{TITLE}}</h1><div>{{ BODY }}</div>")]);
        let html = set.render("view", TemplateData::Page(&page("Home", "Hello, wiki!"))).unwrap();
        assert_eq!(html, "<h1>Home</h1><div>Hello, wiki!</div>");
    }

    #[test]
    fn escapes_body_and_does_not_rescan_it() {
        let set = TemplateSet::from_sources([("view", "{{BODY}}|{{TITLE}}")]);
        let html = set
            .render("view", TemplateData::Page(&page("Home", "<script>{{TITLE}}</script>")))
            .unwrap();
        assert_eq!(html, "&lt;script&gt;{{TITLE}}&lt;/script&gt;|Home");
    }

    #[test]
    fn renders_index_listing() {
        let set = TemplateSet::from_sources([("index", "<h1>{{TITLE}}</h1><ul>{{TITLES}}</ul>")]);
        let listing = IndexListing {
            heading: "Wiki index".to_string(),
            titles: vec!["Alpha".parse::<Title>().unwrap(), "Beta".parse().unwrap()],
        };
        let html = set.render("index", TemplateData::Index(&listing)).unwrap();
        assert_eq!(
            html,
            "<h1>Wiki index</h1><ul><li><a href=\"/view/Alpha\">Alpha</a></li>\n\
             <li><a href=\"/view/Beta\">Beta</a></li>\n</ul>"
        );
    }

    #[test]
    fn missing_template_is_an_error() {
        let set = TemplateSet::default();
        let err = set.render("view", TemplateData::Page(&page("A", ""))).unwrap_err();
        assert!(matches!(err, WikiError::TemplateError(_)));
    }

    #[test]
    fn unknown_or_unterminated_placeholder_is_an_error() {
        let set = TemplateSet::from_sources([("a", "{{TITLES}}"), ("b", "<p>{{TITLE</p>")]);
        let data = TemplateData::Page(&page("A", ""));
        assert!(matches!(set.render("a", data), Err(WikiError::TemplateError(_))));
        assert!(matches!(set.render("b", data), Err(WikiError::TemplateError(_))));
    }

    #[test]
    fn loads_html_files_by_stem() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("view.html"), "{{TITLE}}").unwrap();
        fs::write(dir.path().join("README.txt"), "not a template").unwrap();

        let set = TemplateSet::from_dir(dir.path()).unwrap();
        assert!(set.contains("view"));
        assert!(!set.contains("README"));
        assert_eq!(set.render("view", TemplateData::Page(&page("X", ""))).unwrap(), "X");
    }

    #[test]
    fn missing_template_directory_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            TemplateSet::from_dir(&dir.path().join("nope")),
            Err(WikiError::Io(_))
        ));
    }
}
