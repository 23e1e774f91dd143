//! Wire shapes of the upstream `package_search` action.
//!
//! Every field the catalog may omit is optional so that a sparse dataset
//! never fails the whole response.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageSearchResponse {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub error: Option<serde_json::Value>,

    #[serde(default)]
    pub result: PackageSearchResult,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PackageSearchResult {
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub results: Vec<PackageDto>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PackageDto {
    pub title: Option<String>,
    pub organization: Option<OrganizationRefDto>,
    pub metadata_modified: Option<String>,
    pub resources: Option<Vec<ResourceDto>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrganizationRefDto {
    /// Stable API id, used in `fq=organization:<name>`.
    pub name: Option<String>,

    /// Display name.
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceDto {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sparse_payload() {
        let body = r#"{
            "success": true,
            "result": {
                "count": 2,
                "results": [
                    {
                        "title": "Water Quality",
                        "organization": {"name": "ec", "title": "Environment Canada"},
                        "metadata_modified": "2024-01-02T03:04:05.123456",
                        "resources": [{"url": "https://example.org/a.csv"}]
                    },
                    {"organization": null, "resources": null}
                ]
            }
        }"#;

        let parsed: PackageSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.success, Some(true));
        assert_eq!(parsed.result.count, 2);
        assert_eq!(parsed.result.results.len(), 2);

        let first = &parsed.result.results[0];
        assert_eq!(first.title.as_deref(), Some("Water Quality"));
        assert_eq!(first.resources.as_ref().map(|r| r.len()), Some(1));

        let second = &parsed.result.results[1];
        assert!(second.title.is_none());
        assert!(second.organization.is_none());
        assert!(second.resources.is_none());
    }

    #[test]
    fn test_parse_missing_result() {
        let parsed: PackageSearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.result.count, 0);
        assert!(parsed.result.results.is_empty());
    }
}
