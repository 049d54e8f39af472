use axum::{
    extract::{Form, FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::components::TemplateData;
use crate::config::RootMode;
use crate::errors::WikiError;
use crate::router::{PageAction, PageTitle};
use crate::types::{AppState, IndexListing, Page};

/// The `body` field of a save, whether posted as a form or in the query string
#[derive(Debug, Default, Deserialize)]
pub struct SaveForm {
    pub body: Option<String>,
}

/// 302 Found to `location`
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn render(state: &AppState, template: &str, data: TemplateData<'_>) -> Result<Response, WikiError> {
    let html = state.templates.render(template, data).inspect_err(|e| {
        warn!("Failed to render '{}': {}", template, e);
    })?;
    Ok(Html(html).into_response())
}

/// Handle root path requests
pub async fn handle_root(State(state): State<AppState>) -> Result<Response, WikiError> {
    match &state.config.root {
        RootMode::Redirect(front) => {
            debug!("Redirecting root to '{}'", front);
            Ok(found(PageAction::View.url(front)))
        }
        RootMode::Index => {
            let titles = state.store.list().inspect_err(|e| {
                warn!("Index listing failed: {}", e);
            })?;
            info!("Index request, {} pages", titles.len());
            let listing = IndexListing {
                heading: state.config.index_heading.clone(),
                titles,
            };
            render(&state, "index", TemplateData::Index(&listing))
        }
    }
}

/// Show a page, or send the client to its editor if it does not exist yet
pub async fn handle_view(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    info!("View request for '{}'", title);
    match state.store.load(&title) {
        Ok(page) => render(&state, "view", TemplateData::Page(&page)),
        Err(e) => {
            debug!("Cannot view '{}' ({}), redirecting to editor", title, e);
            Ok(found(PageAction::Edit.url(&title)))
        }
    }
}

/// Show the edit form, blank for pages that do not exist yet
pub async fn handle_edit(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    info!("Edit request for '{}'", title);
    let page = state.store.load(&title).unwrap_or_else(|e| {
        debug!("Editing new page '{}' ({})", title, e);
        Page::blank(title.clone())
    });
    render(&state, "edit", TemplateData::Page(&page))
}

/// Persist the submitted body and redirect to the page view.
///
/// The body comes from the `body` field of a URL-encoded or multipart form,
/// falling back to a `body` query parameter. A save that carries neither is
/// rejected so an existing page is never blanked by a malformed request.
pub async fn handle_save(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
    Query(query): Query<SaveForm>,
    request: Request,
) -> Result<Response, WikiError> {
    let body = match submitted_body(request, &state).await? {
        Some(body) => body,
        None => query.body.map(String::into_bytes).ok_or_else(|| {
            warn!("Save request for '{}' has no body field", title);
            WikiError::InvalidForm("missing \"body\" field".to_string())
        })?,
    };
    info!("Save request for '{}', {} bytes", title, body.len());

    let page = Page::new(title, body);
    state.store.save(&page)?;
    Ok(found(PageAction::View.url(&page.title)))
}

/// The `body` field of the request's form payload, if it has one
async fn submitted_body(request: Request, state: &AppState) -> Result<Option<Vec<u8>>, WikiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| WikiError::InvalidForm(e.to_string()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WikiError::InvalidForm(e.to_string()))?
        {
            if field.name() == Some("body") {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WikiError::InvalidForm(e.to_string()))?;
                return Ok(Some(bytes.to_vec()));
            }
        }
        Ok(None)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<SaveForm>::from_request(request, state)
            .await
            .map_err(|e| WikiError::InvalidForm(e.to_string()))?;
        Ok(form.body.map(String::into_bytes))
    } else {
        debug!("Save body has content type {:?}, not a form", content_type);
        Ok(None)
    }
}

/// Anything the router does not recognise
pub async fn handle_not_found(uri: Uri) -> WikiError {
    warn!("Path not found: '{}'", uri.path());
    WikiError::NotFound
}
