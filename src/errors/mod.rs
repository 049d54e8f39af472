use std::{fmt, io};
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    NotFound,
    InvalidTitle(String),
    InvalidForm(String),
    TemplateError(String),
    Config(String),
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::NotFound => write!(f, "page not found"),
            WikiError::InvalidTitle(raw) => write!(f, "invalid page title: {:?}", raw),
            WikiError::InvalidForm(e) => write!(f, "Invalid form submission: {}", e),
            WikiError::TemplateError(e) => write!(f, "Template error: {}", e),
            WikiError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            // A bad title is indistinguishable from an unknown route to the client
            WikiError::NotFound | WikiError::InvalidTitle(_) => {
                (StatusCode::NOT_FOUND, "404 page not found").into_response()
            }
            WikiError::InvalidForm(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            WikiError::Io(_) | WikiError::TemplateError(_) | WikiError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
