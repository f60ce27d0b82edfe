//! The `scrape` service.
//!
//! It validates the request params, asks the core [`Tracker`] for the
//! swarm counters, and bencodes them. Store failures are logged and
//! degraded to a generic message, like in the announce service.
use log::warn;

use crate::core::error::Error;
use crate::core::Tracker;
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::scrape::Scrape;
use crate::servers::http::v1::responses::error;
use crate::servers::http::v1::responses::scrape::Bencoded;

const INTERNAL_ERROR: &str = "Failed to scrape because of internal server error.";
const TORRENT_NOT_FOUND: &str = "Torrent not found.";

/// Handles one scrape: parameter mapping in, bencoded bytes out.
pub async fn invoke(tracker: &Tracker, query: &Query) -> Vec<u8> {
    let request = match Scrape::try_from(query) {
        Ok(request) => request,
        Err(err) => return error::Error::from(err.to_string()).body(),
    };

    match tracker.scrape(&request.info_hash).await {
        Ok(scrape_data) => Bencoded::from(scrape_data).body(),
        Err(Error::TorrentNotFound { .. }) => error::Error::from(TORRENT_NOT_FOUND.to_string()).body(),
        Err(err) => {
            warn!("scrape failed: {err}");
            error::Error::from(INTERNAL_ERROR.to_string()).body()
        }
    }
}
