use serde::{Deserialize, Serialize};

use crate::catalog::PackageDto;

/// One normalized search result, built fresh from the upstream payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub title: String,
    pub organization_display_name: String,
    pub organization_api_id: String,
    pub last_modified: String,
    pub url: String,
}

pub const MISSING_TEXT: &str = "N/A";
pub const MISSING_MODIFIED: &str = "1970-01-01T00:00:00";
pub const MISSING_URL: &str = "#";

impl From<PackageDto> for DatasetRecord {
    fn from(package: PackageDto) -> Self {
        let (org_id, org_name) = match package.organization {
            Some(org) => (org.name, org.title),
            None => (None, None),
        };
        let url = package
            .resources
            .and_then(|resources| resources.into_iter().next())
            .and_then(|resource| resource.url);

        Self {
            title: package.title.unwrap_or_else(|| MISSING_TEXT.to_string()),
            organization_display_name: org_name.unwrap_or_else(|| MISSING_TEXT.to_string()),
            organization_api_id: org_id.unwrap_or_else(|| MISSING_TEXT.to_string()),
            last_modified: package
                .metadata_modified
                .unwrap_or_else(|| MISSING_MODIFIED.to_string()),
            url: url.unwrap_or_else(|| MISSING_URL.to_string()),
        }
    }
}
