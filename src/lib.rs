//! pagewiki - a small wiki server storing one text file per page
//!
//! Pages are viewed at `/view/{title}`, edited at `/edit/{title}` and saved
//! with a form POST to `/save/{title}`. Titles are ASCII letters and digits
//! and name the `{title}.txt` file holding the page body.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod router;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, RootMode};
pub use errors::WikiError;
pub use types::{AppState, IndexListing, Page, Title};
pub use services::PageStore;
pub use components::{TemplateData, TemplateSet};
pub use router::{build_router, PageAction};
