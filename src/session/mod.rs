//! Per-connection bridge session.
//!
//! A [`Session`] binds one change-tracked state mirror, one translator, one
//! dispatcher and the two channel endpoints (player side, RPC peer side) for
//! the lifetime of one connected peer. Event handling is single-tasked, so
//! the mirrored state needs no locking; sessions are fully isolated from one
//! another.

mod dispatcher;
mod translator;

use std::time::Duration;

use serde_json::{Map, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, WriteHalf},
    sync::broadcast::error::RecvError,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::player::{Capabilities, InternalProps, PlayerCommand, PlayerLink, state_schema};
use crate::rpc::{Outbound, Request, methods};
use crate::store::PropertyTree;

use dispatcher::Dispatcher;
use translator::Translator;

/// Delay before the coalesced re-query of upstream state while playing.
///
/// Compensates for players that do not push periodic ticks on their own: the
/// re-query answer reports playing again, which re-arms the timer once it
/// has fired.
const REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Merges the static capability flags with a property record.
///
/// Always builds a fresh map; the capabilities themselves stay untouched.
pub(crate) fn with_capabilities(capabilities: &Capabilities, value: Value) -> Value {
    let mut merged = match serde_json::to_value(capabilities) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Value::Object(extra) = value {
        merged.extend(extra);
    }
    Value::Object(merged)
}

/// One peer connection's worth of bridge state and wiring.
pub struct Session;

impl Session {
    /// Drives a session until the peer disconnects or the player side goes
    /// away.
    ///
    /// On start the mirrored state is fully marked dirty (so the first event
    /// emits a complete snapshot), an upstream state re-query is issued, and
    /// the ready notification is sent. Teardown is performed exactly once by
    /// leaving this function: the timer, the event subscription and the
    /// state mirror are all owned locally and released on return.
    pub async fn run<S>(stream: S, peer: String, link: PlayerLink, base_url: String)
    where
        S: AsyncRead + AsyncWrite + Send,
    {
        let capabilities = Capabilities::default();
        let (reader, mut writer) = tokio::io::split(stream);
        let mut lines = BufReader::new(reader).lines();
        let mut events = link.subscribe();

        let mut store = PropertyTree::from_schema(&state_schema());
        let mut internal = InternalProps::default();
        let translator = Translator::new(base_url);

        let refresh = tokio::time::sleep(REFRESH_DELAY);
        tokio::pin!(refresh);
        let mut refresh_armed = false;

        store.reset_dirty(true);
        link.send_command(PlayerCommand::GetState);
        let ready = Outbound::notification(methods::STREAM_READY, None);
        if !send_line(&mut writer, &peer, &ready).await {
            info!("Session for {peer} ended before ready notification");
            return;
        }

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if !Self::handle_line(
                            &line,
                            &capabilities,
                            &store,
                            &internal,
                            &link,
                            &mut writer,
                            &peer,
                        )
                        .await
                        {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Peer {peer} closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!("Transport error reading from {peer}: {e}");
                        break;
                    }
                },

                event = events.recv() => match event {
                    Ok(event) => {
                        let translated = translator.apply(&event, &mut store, &mut internal);

                        if translated.arm_refresh && !refresh_armed {
                            refresh.as_mut().reset(Instant::now() + REFRESH_DELAY);
                            refresh_armed = true;
                        }

                        if let Some(changes) = translated.changes {
                            let notification = Outbound::notification(
                                methods::PLAYER_PROPERTIES,
                                Some(with_capabilities(&capabilities, changes)),
                            );
                            if !send_line(&mut writer, &peer, &notification).await {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Every event carries the full player state, so the
                        // next one repairs anything missed.
                        warn!("Session for {peer} lagged, skipped {missed} events");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Player event channel closed, ending session for {peer}");
                        break;
                    }
                },

                () = refresh.as_mut(), if refresh_armed => {
                    refresh_armed = false;
                    link.send_command(PlayerCommand::GetState);
                }
            }
        }

        info!("Session for {peer} torn down");
    }

    /// Decodes and dispatches one inbound wire line.
    ///
    /// Lines that fail to parse to the point of extracting an id are logged
    /// and dropped without a response; the peer has nothing to correlate a
    /// reply against.
    async fn handle_line<S>(
        line: &str,
        capabilities: &Capabilities,
        store: &PropertyTree,
        internal: &InternalProps,
        link: &PlayerLink,
        writer: &mut WriteHalf<S>,
        peer: &str,
    ) -> bool
    where
        S: AsyncRead + AsyncWrite,
    {
        if line.trim().is_empty() {
            return true;
        }

        let request = match Request::from_line(line) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to decode RPC request from {peer}: {e} (line: {line})");
                return true;
            }
        };

        let response = Dispatcher::dispatch(request, capabilities, store, internal, link);
        send_line(writer, peer, &response).await
    }
}

/// Writes one newline-terminated message, reporting whether the transport is
/// still usable.
async fn send_line<S>(writer: &mut WriteHalf<S>, peer: &str, message: &Outbound) -> bool
where
    S: AsyncRead + AsyncWrite,
{
    let line = match message.to_line() {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to serialize outbound message for {peer}: {e}");
            return true;
        }
    };

    let result = async {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await
    }
    .await;

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Transport error writing to {peer}: {e}");
            false
        }
    }
}
