pub mod pagination;
pub mod params;

pub use pagination::PaginationLinks;
pub use params::{CatalogQuery, QueryParameters, SortOrder};

pub const MAIN_CSS: &str = "/assets/css/main.css";

/// Data shared by every full page.
#[derive(Clone)]
pub struct TemplateData {
    pub title: String,
    pub styles: Vec<String>,
}

impl TemplateData {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            styles: vec![MAIN_CSS.to_string()],
        }
    }
}
