//! HTTP server routes for version `v1`.
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use super::handlers::{announce, scrape};
use crate::core::Tracker;

/// It adds the routes to the router.
#[must_use]
pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/announce", get(announce::handle))
        .route("/scrape", get(scrape::handle))
        .with_state(tracker)
}
