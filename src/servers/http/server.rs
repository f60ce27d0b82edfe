//! The HTTP tracker server instance.
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use super::v1::routes::router;
use crate::core::Tracker;

/// Binds the listener and spawns the server task.
///
/// The peer IP fallback is the connection's remote address, so the router
/// is installed with connect info.
///
/// # Errors
///
/// Will return an `std::io::Error` if the listener cannot bind to
/// `bind_address`.
pub async fn start(bind_address: SocketAddr, tracker: Arc<Tracker>) -> std::io::Result<JoinHandle<()>> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    let address = listener.local_addr()?;

    info!("HTTP tracker started on: http://{address}");

    let app = router(tracker).into_make_service_with_connect_info::<SocketAddr>();

    Ok(tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("the HTTP tracker server should not crash");
    }))
}
