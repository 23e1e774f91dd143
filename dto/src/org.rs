use serde::{Deserialize, Serialize};

pub const ALL_ORGANIZATIONS: &str = "All Organizations";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationEntry {
    pub id: String,
    pub name: String,
}

impl OrganizationEntry {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// The "no filter" entry shown first in the organization dropdown.
    pub fn all() -> Self {
        Self::new("", ALL_ORGANIZATIONS)
    }
}
