//! Player-side domain types and channel plumbing.
//!
//! The upstream player pushes [`StateUpdate`] events and accepts
//! [`PlayerCommand`]s. Both travel over the channel pair created by
//! [`PlayerLink::channel`]; the connector that actually speaks to the player
//! lives outside this crate and drives the [`PlayerEndpoint`] half.

mod command;
mod link;
mod types;

pub use command::PlayerCommand;
pub use link::{PlayerEndpoint, PlayerLink};
pub use types::{
    Capabilities, InternalProps, LoopStatus, PlaybackStatus, RADIO_SERVICE, StateUpdate,
    state_schema,
};
