use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::{get, post, MethodRouter},
    Router,
};
use log::debug;

use crate::errors::WikiError;
use crate::handlers::{handle_edit, handle_not_found, handle_root, handle_save, handle_view};
use crate::types::{AppState, Title};

/// The per-page actions, each served under `/{prefix}/{title}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    View,
    Edit,
    Save,
}

impl PageAction {
    pub const ALL: [PageAction; 3] = [PageAction::View, PageAction::Edit, PageAction::Save];

    pub fn prefix(self) -> &'static str {
        match self {
            PageAction::View => "view",
            PageAction::Edit => "edit",
            PageAction::Save => "save",
        }
    }

    /// Path of this action for `title`
    pub fn url(self, title: &Title) -> String {
        format!("/{}/{}", self.prefix(), title)
    }

    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            PageAction::View => get(handle_view),
            PageAction::Edit => get(handle_edit),
            PageAction::Save => post(handle_save),
        }
    }
}

/// Title taken from the `:title` path segment.
///
/// Extraction fails with a 404 when the segment is not a valid title, so the
/// page handlers never run for one.
#[derive(Debug, Clone)]
pub struct PageTitle(pub Title);

#[async_trait]
impl<S> FromRequestParts<S> for PageTitle
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!("No title in {}: {}", parts.uri.path(), e);
                WikiError::NotFound
            })?;
        let title = raw.parse::<Title>().inspect_err(|_| {
            debug!("Rejected title {:?} in {}", raw, parts.uri.path());
        })?;
        Ok(PageTitle(title))
    }
}

/// Build the application router: `/`, one route per [`PageAction`], and a
/// not-found fallback for everything else
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/", get(handle_root));
    for action in PageAction::ALL {
        let path = format!("/{}/:title", action.prefix());
        router = router.route(&path, action.method_router());
    }
    router.fallback(handle_not_found).with_state(state)
}
