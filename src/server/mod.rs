//! TCP connection manager.
//!
//! Thin shell around the sessions: accepts peers, spawns one [`Session`]
//! task per connection and tears nothing down itself; a session owns its
//! resources and releases them when its task returns.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};

use crate::config::Config;
use crate::core::Result;
use crate::player::PlayerLink;
use crate::session::Session;

/// Binds the configured address and serves peers until shutdown.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound. Accept failures are
/// logged and retried; they do not end the server.
pub async fn run(config: &Config, link: PlayerLink, shutdown: watch::Receiver<bool>) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    serve(listener, link, config.art.base_url.clone(), shutdown).await
}

/// Serves peers on an already-bound listener until shutdown.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub async fn serve(
    listener: TcpListener,
    link: PlayerLink,
    base_url: String,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let local = listener.local_addr()?;
    info!("Listening on tcp://{local} for stream peers");

    let sessions = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            accept = listener.accept() => match accept {
                Ok((stream, peer_addr)) => {
                    let count = sessions.fetch_add(1, Ordering::SeqCst) + 1;
                    info!("Peer {peer_addr} connected, session count: {count}");

                    let link = link.clone();
                    let base_url = base_url.clone();
                    let sessions = Arc::clone(&sessions);
                    tokio::spawn(async move {
                        Session::run(stream, peer_addr.to_string(), link, base_url).await;
                        let count = sessions.fetch_sub(1, Ordering::SeqCst) - 1;
                        info!("Peer {peer_addr} disconnected, session count: {count}");
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection on {local}: {e}");
                }
            }
        }
    }

    info!("Connection manager on {local} shut down");
    Ok(())
}
