//! Line-delimited JSON-RPC 2.0 wire types.
//!
//! The peer protocol carries three shapes: requests (with an id), responses
//! (success or error, correlated by id) and notifications (no id). Each
//! message occupies one newline-terminated line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version stamped on every outbound message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes used by the bridge.
pub mod codes {
    /// The requested method is not recognized.
    pub const METHOD_NOT_FOUND: i64 = -32601;

    /// The request parameters are invalid or unsupported.
    pub const INVALID_PARAMS: i64 = -32602;
}

/// RPC method names on the peer wire.
pub mod methods {
    /// Inbound: playback control command.
    pub const CONTROL: &str = "Plugin.Stream.Player.Control";

    /// Inbound: set a single player property.
    pub const SET_PROPERTY: &str = "Plugin.Stream.Player.SetProperty";

    /// Inbound: read capabilities plus full player state.
    pub const GET_PROPERTIES: &str = "Plugin.Stream.Player.GetProperties";

    /// Outbound notification: stream session is ready.
    pub const STREAM_READY: &str = "Plugin.Stream.Ready";

    /// Outbound notification: property delta.
    pub const PLAYER_PROPERTIES: &str = "Plugin.Stream.Player.Properties";
}

/// An inbound request envelope.
///
/// Requests that do not parse far enough to yield an id cannot be answered
/// and are dropped by the session after logging.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Correlation id chosen by the peer (number or string).
    pub id: Value,

    /// Method name.
    pub method: String,

    /// Method parameters, when present.
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// Parses one wire line into a request.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error when the line is not a well-formed
    /// request envelope.
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// An outbound message: response or notification.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Outbound {
    /// Successful response to a request.
    Success {
        /// Protocol version, always "2.0".
        jsonrpc: &'static str,
        /// Correlation id echoed from the request.
        id: Value,
        /// Result payload.
        result: Value,
    },

    /// Error response to a request.
    Error {
        /// Protocol version, always "2.0".
        jsonrpc: &'static str,
        /// Correlation id echoed from the request.
        id: Value,
        /// Error detail.
        error: ErrorBody,
    },

    /// Unsolicited notification (no id).
    Notification {
        /// Protocol version, always "2.0".
        jsonrpc: &'static str,
        /// Notification method name.
        method: &'static str,
        /// Notification parameters, omitted when absent.
        #[serde(skip_serializing_if = "Option::is_none")]
        params: Option<Value>,
    },
}

/// Code and message of an error response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    /// JSON-RPC error code.
    pub code: i64,

    /// Human-readable failure message.
    pub message: String,
}

impl Outbound {
    /// Builds a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Outbound::Success {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }

    /// Builds an error response.
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Outbound::Error {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    /// Builds a notification.
    pub fn notification(method: &'static str, params: Option<Value>) -> Self {
        Outbound::Notification {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }

    /// Serializes the message as one wire line (without the trailing newline).
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error; cannot occur for the payloads the
    /// bridge constructs.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
