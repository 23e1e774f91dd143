use core::fmt;
use serde::Deserialize;
use snafu::OptionExt;
use tracing::warn;
use urlencoding::encode;

use crate::Result;
use crate::error::BadRequestSnafu;
use dto::org::ALL_ORGANIZATIONS;

/// Raw query string of the catalog page, before any normalization.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub organization: Option<String>,
    pub sort: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
    #[default]
    None,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Self {
        match value.trim() {
            "newest" => SortOrder::Newest,
            "oldest" => SortOrder::Oldest,
            _ => SortOrder::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::None => "none",
        }
    }

    /// Direction for the upstream `metadata_modified` sort directive.
    pub fn direction(&self) -> Option<&'static str> {
        match self {
            SortOrder::Newest => Some("desc"),
            SortOrder::Oldest => Some("asc"),
            SortOrder::None => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryParameters {
    pub page: u32,

    /// Trimmed and lower-cased; empty means no keyword filter.
    pub search_query: String,

    /// Organization API id; empty means all organizations.
    pub selected_org: String,

    pub sort_order: SortOrder,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            page: 1,
            search_query: "".to_string(),
            selected_org: "".to_string(),
            sort_order: SortOrder::None,
        }
    }
}

impl QueryParameters {
    pub fn from_query(query: &CatalogQuery) -> Result<Self> {
        let page = parse_page(query.page.as_deref())?;
        let search_query = query
            .search
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        let mut selected_org = query
            .organization
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string();
        if selected_org.starts_with('{') {
            warn!("Received invalid organization format, ignoring it");
            selected_org = "".to_string();
        }
        if selected_org == ALL_ORGANIZATIONS {
            selected_org = "".to_string();
        }

        let sort_order = SortOrder::from_param(query.sort.as_deref().unwrap_or(""));

        Ok(Self {
            page,
            search_query,
            selected_org,
            sort_order,
        })
    }

    pub fn has_keyword(&self) -> bool {
        !self.search_query.is_empty()
    }

    pub fn organization_filter(&self) -> Option<&str> {
        if self.selected_org.is_empty() {
            None
        } else {
            Some(self.selected_org.as_str())
        }
    }

    /// Query string suffix that carries the current filters over to
    /// pagination links, e.g. `&search=water&sort=newest`.
    pub fn link_suffix(&self) -> String {
        let mut suffix = String::new();
        if self.has_keyword() {
            suffix.push_str(&format!("&search={}", encode(&self.search_query)));
        }
        if let Some(org) = self.organization_filter() {
            suffix.push_str(&format!("&organization={}", encode(org)));
        }
        if self.sort_order != SortOrder::None {
            suffix.push_str(&format!("&sort={}", self.sort_order));
        }
        suffix
    }
}

fn parse_page(value: Option<&str>) -> Result<u32> {
    let raw = value.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(1);
    }

    let page = raw.parse::<i64>().ok().context(BadRequestSnafu {
        msg: format!("Invalid page number: {}", raw),
    })?;

    u32::try_from(page.max(1)).ok().context(BadRequestSnafu {
        msg: format!("Page number out of range: {}", raw),
    })
}
