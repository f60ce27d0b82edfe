//! Application wiring.
//!
//! The app owns the startup sequence: parse the bind address from the
//! configuration, hand the tracker to the HTTP server job, and return the
//! join handle the main binary waits on. Configuration errors here are
//! fatal on purpose; a tracker with a bad address or database has nothing
//! useful to do.
use std::net::SocketAddr;
use std::sync::Arc;

use bittrack_configuration::Configuration;
use tokio::task::JoinHandle;

use crate::core::Tracker;
use crate::servers::http;

/// Starts the HTTP tracker job.
///
/// # Panics
///
/// Will panic if the configured bind address is invalid or the listener
/// cannot bind to it.
pub async fn start(config: &Configuration, tracker: Arc<Tracker>) -> JoinHandle<()> {
    let bind_address = config
        .bind_address
        .parse::<SocketAddr>()
        .expect("invalid bind_address in configuration");

    http::server::start(bind_address, tracker)
        .await
        .expect("could not bind the HTTP tracker listener")
}
