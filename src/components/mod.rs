pub mod templates;

pub use templates::{TemplateData, TemplateSet};
