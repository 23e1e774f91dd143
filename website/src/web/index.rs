use askama::Template;
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
};
use snafu::ResultExt;

use crate::{
    Result,
    error::{ResponseBuilderSnafu, TemplateSnafu},
    models::{CatalogQuery, PaginationLinks, QueryParameters, TemplateData},
    run::AppState,
    services::datasets::query_catalog,
};
use dto::dataset::DatasetRecord;
use dto::org::OrganizationEntry;

#[derive(Template)]
#[template(path = "pages/index.html")]
struct IndexTemplate {
    t: TemplateData,
    datasets: Vec<DatasetRecord>,
    pagination: PaginationLinks,
    organizations: Vec<OrganizationEntry>,
    selected_org: String,
    search_query: String,
    sort_order: String,
}

pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response<Body>> {
    let params = QueryParameters::from_query(&query)?;
    let page = query_catalog(state.catalog.as_ref(), &state.config.catalog, &params).await?;

    let t = TemplateData::new("Open Data Catalog");
    let pagination = PaginationLinks::new(&page.datasets.meta, "", &params.link_suffix());

    let tpl = IndexTemplate {
        t,
        datasets: page.datasets.data,
        pagination,
        organizations: page.organizations,
        selected_org: page.params.selected_org,
        search_query: page.params.search_query,
        sort_order: page.params.sort_order.to_string(),
    };

    Ok(Response::builder()
        .status(200)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(tpl.render().context(TemplateSnafu)?))
        .context(ResponseBuilderSnafu)?)
}
