//! The `announce` service.
//!
//! It validates the request params, resolves the effective peer IP, asks
//! the core [`Tracker`] to register the announce, and encodes the response
//! in the format the client asked for. Every outcome is a bencoded body;
//! store failures are logged here and degraded to a generic message so no
//! internal detail leaks to clients.
use std::net::IpAddr;

use log::warn;

use crate::core::error::Error;
use crate::core::{PeerAnnounce, Tracker};
use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::announce::Announce;
use crate::servers::http::v1::responses::announce::{Compact, Dictionary};
use crate::servers::http::v1::responses::error;

const INTERNAL_ERROR: &str = "Failed to announce because of internal server error.";
const TORRENT_NOT_FOUND: &str = "Torrent not found.";

/// Handles one announce: parameter mapping in, bencoded bytes out.
///
/// The effective peer IP is the `ip` param when given, else the configured
/// default, else `remote_ip` (the transport's remote address).
pub async fn invoke(tracker: &Tracker, query: &Query, remote_ip: IpAddr) -> Vec<u8> {
    let request = match Announce::try_from(query) {
        Ok(request) => request,
        Err(err) => return error::Error::from(err.to_string()).body(),
    };

    let peer_ip = request
        .ip
        .or_else(|| tracker.get_default_peer_ip())
        .unwrap_or(remote_ip);

    let announce = PeerAnnounce {
        info_hash: request.info_hash,
        peer_id: request.peer_id,
        ip: peer_ip,
        port: request.port,
        uploaded: request.uploaded,
        downloaded: request.downloaded,
        left: request.left,
        event: request.event,
    };

    match tracker.announce(&announce).await {
        Ok(data) => {
            if request.compact.unwrap_or_else(|| tracker.compact_by_default()) {
                Compact::from(data).body()
            } else {
                Dictionary::new(data, !request.no_peer_id).body()
            }
        }
        Err(Error::TorrentNotFound { .. }) => error::Error::from(TORRENT_NOT_FOUND.to_string()).body(),
        Err(err) => {
            warn!("announce failed: {err}");
            error::Error::from(INTERNAL_ERROR.to_string()).body()
        }
    }
}
