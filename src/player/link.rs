use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use super::{PlayerCommand, StateUpdate};

/// Session-facing handle to the player channels.
///
/// Cloned into every session: each session subscribes to the event stream
/// and sends commands through the shared sender.
#[derive(Debug, Clone)]
pub struct PlayerLink {
    events: broadcast::Sender<StateUpdate>,
    commands: mpsc::UnboundedSender<PlayerCommand>,
}

/// Connector-facing half of the player channels.
///
/// The host's player connector publishes state updates through `events` and
/// drains `commands` toward the player.
#[derive(Debug)]
pub struct PlayerEndpoint {
    /// Publish side for state-update events.
    pub events: broadcast::Sender<StateUpdate>,

    /// Receive side for upstream commands.
    pub commands: mpsc::UnboundedReceiver<PlayerCommand>,
}

impl PlayerLink {
    /// Creates the link/endpoint pair.
    ///
    /// `capacity` bounds the event broadcast buffer; a session that lags
    /// behind it misses intermediate snapshots, which is acceptable since
    /// every event carries the full player state.
    pub fn channel(capacity: usize) -> (PlayerLink, PlayerEndpoint) {
        let (events, _) = broadcast::channel(capacity);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        (
            PlayerLink {
                events: events.clone(),
                commands: command_tx,
            },
            PlayerEndpoint {
                events,
                commands: command_rx,
            },
        )
    }

    /// Subscribes to the state-update event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.events.subscribe()
    }

    /// Sends a command toward the player, fire-and-forget.
    ///
    /// Returns whether the player side is still attached.
    pub fn send_command(&self, command: PlayerCommand) -> bool {
        match self.commands.send(command) {
            Ok(()) => true,
            Err(err) => {
                debug!("Player endpoint detached, dropping command: {:?}", err.0);
                false
            }
        }
    }
}
