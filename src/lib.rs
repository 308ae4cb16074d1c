//! Snapmeta - Snapcast stream metadata and control bridge.
//!
//! Snapmeta mirrors the state of an upstream media player and exposes it to
//! stream peers over line-delimited JSON-RPC. The main pieces are:
//!
//! - A change-tracked state store, so notifications carry only the delta
//! - A translator from player state-push events into the mirrored state
//! - A dispatcher from peer RPC requests into player control commands
//! - One isolated session per connected peer
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use snapmeta::{config::Config, player::PlayerLink, server};
//! use tokio::sync::watch;
//!
//! # async fn demo() -> snapmeta::Result<()> {
//! let config = Config::default();
//! let (link, endpoint) = PlayerLink::channel(32);
//! // Attach a player connector to `endpoint`, then:
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! server::run(&config, link, shutdown_rx).await?;
//! # Ok(())
//! # }
//! ```

/// Configuration schema, defaults and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Player-side domain types and channel plumbing.
pub mod player;

/// Line-delimited JSON-RPC wire types.
pub mod rpc;

/// TCP connection manager.
pub mod server;

/// Per-connection bridge session.
pub mod session;

/// Change-tracked property storage.
pub mod store;

/// Tracing initialization.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{BridgeError, Result};
