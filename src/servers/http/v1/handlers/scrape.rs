use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::response::Response;
use log::debug;

use crate::core::Tracker;
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::{responses, services};

/// Handles `GET /scrape`.
pub async fn handle(State(tracker): State<Arc<Tracker>>, RawQuery(raw_query): RawQuery) -> Response {
    debug!("http scrape request: {raw_query:?}");

    let query = Query::from(raw_query.unwrap_or_default().as_str());
    let body = services::scrape::invoke(&tracker, &query).await;

    responses::bencoded(body)
}
