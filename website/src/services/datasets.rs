use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::Result;
use crate::config::CatalogConfig;
use crate::models::{QueryParameters, SortOrder};
use crate::services::catalog::{CatalogSearch, SearchRequest};
use dto::dataset::DatasetRecord;
use dto::org::OrganizationEntry;
use dto::pagination::PaginatedDto;

const MODIFIED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Everything the catalog page needs to render.
#[derive(Clone, Debug)]
pub struct CatalogPage {
    pub datasets: PaginatedDto<DatasetRecord>,
    pub organizations: Vec<OrganizationEntry>,
    pub params: QueryParameters,
}

/// Runs one catalog query, issuing exactly one upstream call.
///
/// With a keyword, a large batch is fetched and then filtered, sorted and
/// paginated locally, since upstream relevance search cannot do an exact
/// title substring match. Without one, paging and sorting are left to the
/// upstream catalog.
pub async fn query_catalog(
    catalog: &dyn CatalogSearch,
    config: &CatalogConfig,
    params: &QueryParameters,
) -> Result<CatalogPage> {
    if params.has_keyword() {
        keyword_search(catalog, config, params).await
    } else {
        browse(catalog, config, params).await
    }
}

async fn keyword_search(
    catalog: &dyn CatalogSearch,
    config: &CatalogConfig,
    params: &QueryParameters,
) -> Result<CatalogPage> {
    let request = SearchRequest::keyword(
        config.keyword_rows,
        &params.search_query,
        params.organization_filter(),
    );
    let result = catalog.search(&request).await?;
    let fetched = result.results.len();

    let mut records: Vec<DatasetRecord> = result
        .results
        .into_iter()
        .map(DatasetRecord::from)
        .filter(|record| title_matches(record, &params.search_query))
        .collect();

    debug!(
        "Keyword '{}' matched {} of {} fetched datasets",
        &params.search_query,
        records.len(),
        fetched
    );

    sort_records(&mut records, params.sort_order);

    // Built from every match, not only the visible page
    let organizations = collect_organizations(&records);
    let datasets = PaginatedDto::from_all(records, params.page, config.per_page);

    Ok(CatalogPage {
        datasets,
        organizations,
        params: params.clone(),
    })
}

async fn browse(
    catalog: &dyn CatalogSearch,
    config: &CatalogConfig,
    params: &QueryParameters,
) -> Result<CatalogPage> {
    let request = SearchRequest::page(
        params.page,
        config.per_page,
        params.organization_filter(),
        params.sort_order,
    );
    let result = catalog.search(&request).await?;

    let mut records: Vec<DatasetRecord> = result
        .results
        .into_iter()
        .map(DatasetRecord::from)
        .collect();
    records.truncate(config.per_page as usize);

    let organizations = collect_organizations(&records);
    let datasets = PaginatedDto::new(records, params.page, config.per_page, result.count);

    Ok(CatalogPage {
        datasets,
        organizations,
        params: params.clone(),
    })
}

/// Case-insensitive substring match; `keyword` is already lower-cased.
pub fn title_matches(record: &DatasetRecord, keyword: &str) -> bool {
    record.title.to_lowercase().contains(keyword)
}

/// Stable sort on the parsed modification time.
pub fn sort_records(records: &mut [DatasetRecord], order: SortOrder) {
    match order {
        SortOrder::Newest => {
            records.sort_by_cached_key(|r| Reverse(parse_modified(&r.last_modified)))
        }
        SortOrder::Oldest => records.sort_by_cached_key(|r| parse_modified(&r.last_modified)),
        SortOrder::None => {}
    }
}

/// Unparsable timestamps sort as the epoch.
pub fn parse_modified(value: &str) -> NaiveDateTime {
    match NaiveDateTime::parse_from_str(value, MODIFIED_FORMAT) {
        Ok(dt) => dt,
        Err(e) => {
            warn!("Invalid modified timestamp '{}': {}", value, e);
            DateTime::<Utc>::UNIX_EPOCH.naive_utc()
        }
    }
}

/// Organization dropdown: unique ids in first-seen order (last display name
/// wins), stable-sorted by display name, with "All Organizations" first.
pub fn collect_organizations(records: &[DatasetRecord]) -> Vec<OrganizationEntry> {
    let mut organizations: Vec<OrganizationEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let id = record.organization_api_id.as_str();
        let name = record.organization_display_name.as_str();
        match index.get(id) {
            Some(&i) => organizations[i].name = name.to_string(),
            None => {
                index.insert(id, organizations.len());
                organizations.push(OrganizationEntry::new(id, name));
            }
        }
    }

    organizations.sort_by(|a, b| a.name.cmp(&b.name));
    organizations.insert(0, OrganizationEntry::all());

    organizations
}
