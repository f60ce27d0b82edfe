use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, RawQuery, State};
use axum::response::Response;
use log::debug;

use crate::core::Tracker;
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::{responses, services};

/// Handles `GET /announce`.
///
/// The query string is taken raw: `info_hash` and `peer_id` carry
/// percent-encoded binary that axum's string extractors would mangle.
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    RawQuery(raw_query): RawQuery,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Response {
    debug!("http announce request: {raw_query:?} from {client}");

    let query = Query::from(raw_query.unwrap_or_default().as_str());
    let body = services::announce::invoke(&tracker, &query, client.ip()).await;

    responses::bencoded(body)
}
