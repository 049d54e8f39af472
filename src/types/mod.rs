use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::warn;

use crate::components::TemplateSet;
use crate::config::{Config, RootMode};
use crate::errors::WikiError;
use crate::services::PageStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: PageStore,
    pub templates: Arc<TemplateSet>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the page store and load templates as described by `config`
    pub fn from_config(config: Config) -> Result<Self, WikiError> {
        let store = PageStore::open(config.data_dir.clone())?;
        let templates = TemplateSet::from_dir(&config.template_dir)?;
        for name in required_templates(&config.root) {
            if !templates.contains(name) {
                warn!(
                    "No '{}' template in {:?}, requests that render it will fail",
                    name, config.template_dir
                );
            }
        }
        Ok(Self {
            store,
            templates: Arc::new(templates),
            config: Arc::new(config),
        })
    }
}

/// Templates the handlers render under a given root mode
pub fn required_templates(root: &RootMode) -> &'static [&'static str] {
    match root {
        RootMode::Index => &["view", "edit", "index"],
        RootMode::Redirect(_) => &["view", "edit"],
    }
}

/// A validated page title: one or more ASCII letters or digits.
///
/// The title doubles as the storage key, so it is only ever built through
/// [`FromStr`], which rejects anything outside `[a-zA-Z0-9]+`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Title(String);

impl Title {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Title {
    type Err = WikiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Title(raw.to_string()))
        } else {
            Err(WikiError::InvalidTitle(raw.to_string()))
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single wiki page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self { title, body: body.into() }
    }

    /// A page that has never been saved
    pub fn blank(title: Title) -> Self {
        Self { title, body: Vec::new() }
    }
}

/// Data behind the index page
#[derive(Debug, Clone)]
pub struct IndexListing {
    pub heading: String,
    pub titles: Vec<Title>,
}
