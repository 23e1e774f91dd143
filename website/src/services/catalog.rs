use async_trait::async_trait;
use core::fmt;
use reqwest::Client;
use snafu::ResultExt;
use std::time::Duration;
use tracing::debug;
use urlencoding::encode;

use crate::Result;
use crate::error::{
    HttpClientBuildSnafu, HttpClientSnafu, HttpResponseParseSnafu, UPSTREAM_FAILED,
    UpstreamRejectedSnafu, UpstreamStatusSnafu,
};
use crate::models::SortOrder;
use dto::catalog::{PackageSearchResponse, PackageSearchResult};

/// One `package_search` call against the upstream catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub start: Option<u64>,
    pub rows: u32,
    pub q: Option<String>,
    pub organization: Option<String>,
    pub sort: SortOrder,
}

impl SearchRequest {
    /// Large relevance batch for a keyword, filtered locally afterwards.
    pub fn keyword(rows: u32, keyword: &str, organization: Option<&str>) -> Self {
        Self {
            start: None,
            rows,
            q: Some(keyword.to_string()),
            organization: organization.map(|o| o.to_string()),
            sort: SortOrder::None,
        }
    }

    /// Exactly one page, paginated and sorted by the upstream.
    pub fn page(
        page: u32,
        per_page: u32,
        organization: Option<&str>,
        sort: SortOrder,
    ) -> Self {
        let start = (page.saturating_sub(1) as u64) * (per_page as u64);
        Self {
            start: Some(start),
            rows: per_page,
            q: None,
            organization: organization.map(|o| o.to_string()),
            sort,
        }
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "start={}&", start)?;
        }
        write!(f, "rows={}", self.rows)?;
        if let Some(q) = &self.q {
            write!(f, "&q={}", encode(q))?;
        }
        if let Some(org) = &self.organization {
            write!(f, "&fq=organization:{}", encode(org))?;
        }
        if let Some(direction) = self.sort.direction() {
            write!(f, "&sort=metadata_modified+{}", direction)?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<PackageSearchResult>;
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context(HttpClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, request: &SearchRequest) -> String {
        format!("{}/package_search?{}", self.base_url, request)
    }
}

#[async_trait]
impl CatalogSearch for CatalogClient {
    async fn search(&self, request: &SearchRequest) -> Result<PackageSearchResult> {
        let url = self.search_url(request);
        debug!("Fetching catalog data -> {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context(HttpClientSnafu {
                msg: UPSTREAM_FAILED,
            })?;

        let status = response.status();
        if !status.is_success() {
            return UpstreamStatusSnafu { status }.fail();
        }

        let body = response
            .json::<PackageSearchResponse>()
            .await
            .context(HttpResponseParseSnafu {
                msg: UPSTREAM_FAILED,
            })?;

        if body.success == Some(false) {
            let msg = match body.error {
                Some(err) => err.to_string(),
                None => "catalog rejected the query".to_string(),
            };
            return UpstreamRejectedSnafu { msg }.fail();
        }

        Ok(body.result)
    }
}

#[cfg(test)]
pub struct CatalogTestClient {
    packages: Vec<dto::catalog::PackageDto>,
    count: Option<u64>,
    failure: Option<String>,
    requests: std::sync::Mutex<Vec<SearchRequest>>,
}

#[cfg(test)]
impl CatalogTestClient {
    pub fn new(packages: Vec<dto::catalog::PackageDto>) -> Self {
        Self {
            packages,
            count: None,
            failure: None,
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Reports a total larger than the packages held, like a real catalog.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn failing(msg: &str) -> Self {
        let mut client = Self::new(Vec::new());
        client.failure = Some(msg.to_string());
        client
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CatalogSearch for CatalogTestClient {
    async fn search(&self, request: &SearchRequest) -> Result<PackageSearchResult> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(msg) = &self.failure {
            return UpstreamRejectedSnafu { msg: msg.clone() }.fail();
        }

        let start = request.start.unwrap_or(0) as usize;
        let results = self
            .packages
            .iter()
            .skip(start)
            .take(request.rows as usize)
            .cloned()
            .collect();

        Ok(PackageSearchResult {
            count: self.count.unwrap_or(self.packages.len() as u64),
            results,
        })
    }
}

#[cfg(test)]
pub fn create_test_package(
    title: &str,
    org_id: &str,
    org_name: &str,
    modified: &str,
) -> dto::catalog::PackageDto {
    use dto::catalog::{OrganizationRefDto, PackageDto, ResourceDto};

    PackageDto {
        title: Some(title.to_string()),
        organization: Some(OrganizationRefDto {
            name: Some(org_id.to_string()),
            title: Some(org_name.to_string()),
        }),
        metadata_modified: Some(modified.to_string()),
        resources: Some(vec![ResourceDto {
            url: Some(format!("https://example.org/{}.csv", org_id)),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn spawn_upstream(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/3/action/", addr)
    }

    #[test]
    fn test_keyword_query_string() {
        let request = SearchRequest::keyword(1000, "clean water", None);
        assert_eq!(request.to_string(), "rows=1000&q=clean%20water");

        let request = SearchRequest::keyword(1000, "budget", Some("tbs-sct"));
        assert_eq!(
            request.to_string(),
            "rows=1000&q=budget&fq=organization:tbs-sct"
        );
    }

    #[test]
    fn test_page_query_string() {
        let request = SearchRequest::page(1, 20, None, SortOrder::None);
        assert_eq!(request.to_string(), "start=0&rows=20");

        let request = SearchRequest::page(3, 20, Some("ec"), SortOrder::Newest);
        assert_eq!(
            request.to_string(),
            "start=40&rows=20&fq=organization:ec&sort=metadata_modified+desc"
        );

        let request = SearchRequest::page(2, 20, None, SortOrder::Oldest);
        assert_eq!(
            request.to_string(),
            "start=20&rows=20&sort=metadata_modified+asc"
        );
    }

    #[test]
    fn test_search_url_trims_slash() {
        let client = CatalogClient::new(
            "https://open.canada.ca/data/en/api/3/action/",
            Duration::from_secs(10),
        )
        .unwrap();
        let url = client.search_url(&SearchRequest::page(1, 20, None, SortOrder::None));
        assert_eq!(
            url,
            "https://open.canada.ca/data/en/api/3/action/package_search?start=0&rows=20"
        );
    }

    #[tokio::test]
    async fn test_search_success() {
        let app = Router::new().route(
            "/api/3/action/package_search",
            get(|| async {
                axum::Json(json!({
                    "success": true,
                    "result": {
                        "count": 45,
                        "results": [
                            {
                                "title": "Water Quality",
                                "organization": {"name": "ec", "title": "Environment Canada"},
                                "metadata_modified": "2024-01-02T03:04:05.123456",
                                "resources": [{"url": "https://example.org/water.csv"}]
                            }
                        ]
                    }
                }))
            }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CatalogClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let result = client
            .search(&SearchRequest::page(1, 20, None, SortOrder::None))
            .await
            .unwrap();
        assert_eq!(result.count, 45);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].title.as_deref(), Some("Water Quality"));
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let app = Router::new().route(
            "/api/3/action/package_search",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down").into_response() }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CatalogClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client
            .search(&SearchRequest::page(1, 20, None, SortOrder::None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus { .. }));
        assert!(err.to_string().contains("API request failed"));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_search_malformed_json() {
        let app = Router::new().route(
            "/api/3/action/package_search",
            get(|| async { "this is not json" }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CatalogClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client
            .search(&SearchRequest::keyword(1000, "water", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpResponseParse { .. }));
        assert!(err.to_string().starts_with("API request failed"));
    }

    #[tokio::test]
    async fn test_search_rejected_by_catalog() {
        let app = Router::new().route(
            "/api/3/action/package_search",
            get(|| async {
                axum::Json(json!({
                    "success": false,
                    "error": {"message": "Invalid sort field"}
                }))
            }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CatalogClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let err = client
            .search(&SearchRequest::page(1, 20, None, SortOrder::Newest))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamRejected { .. }));
        assert!(err.to_string().contains("Invalid sort field"));
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let app = Router::new().route(
            "/api/3/action/package_search",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(json!({"success": true, "result": {"count": 0, "results": []}}))
            }),
        );
        let base_url = spawn_upstream(app).await;
        let client = CatalogClient::new(&base_url, Duration::from_millis(200)).unwrap();

        let err = client
            .search(&SearchRequest::page(1, 20, None, SortOrder::None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpClient { .. }));
        assert!(err.to_string().starts_with("API request failed"));
    }

    #[tokio::test]
    async fn test_search_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            CatalogClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = client
            .search(&SearchRequest::keyword(1000, "water", None))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_test_client_paginates() {
        let packages = (0..45)
            .map(|i| {
                create_test_package(
                    &format!("Dataset {}", i),
                    "ec",
                    "Environment Canada",
                    "2024-01-01T00:00:00",
                )
            })
            .collect();
        let client = CatalogTestClient::new(packages);

        let result = client
            .search(&SearchRequest::page(3, 20, None, SortOrder::None))
            .await
            .unwrap();
        assert_eq!(result.count, 45);
        assert_eq!(result.results.len(), 5);
        assert_eq!(client.requests().len(), 1);
    }
}
