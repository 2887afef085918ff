//! RPC message schema.
//!
//! Every frame on the wire is one JSON envelope:
//!
//! ```json
//! {"method": "<name>", "payload": {...}}
//! ```
//!
//! The envelope maps onto serde's adjacently tagged representation, so
//! the same enum definition drives serialization of outbound frames and
//! dispatch of inbound ones. There is no version field, message id, or
//! checksum; each frame is decoded independently.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Identifies a player for the lifetime of a session. Assigned by the
/// server in `login_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i32);

/// Envelope header, decoded before the payload to pick a variant.
#[derive(Debug, Deserialize)]
struct Header {
    method: String,
}

/// Server -> client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "payload", rename_all = "snake_case")]
pub enum ServerRpc {
    /// Liveness echo. The protocol defines no reply.
    Ping(PingPayload),
    /// Assigns the durable id of the local player.
    LoginResponse(LoginResponsePayload),
    /// Snapshot of all known players as of a server tick.
    Sync(SyncPayload),
    /// A world item spawn, not tied to any player.
    Spawn(SpawnPayload),
}

/// Client -> server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "payload", rename_all = "snake_case")]
pub enum ClientRpc {
    /// Sent once, immediately after the transport connects.
    Login(LoginPayload),
    /// Sent when the local player's position changed since last frame.
    PlayerUpdate(PlayerUpdatePayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponsePayload {
    pub id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdatePayload {
    pub id: PlayerId,
    pub position: Vec3,
}

/// One player entry within a sync snapshot. Ids are unique within a
/// snapshot; entry order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub players: Vec<PlayerState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPayload {
    pub position: Vec3,
}

/// Methods `decode_frame` dispatches through the `ServerRpc` schema.
/// Must agree with the serde tags; `tags_agree_with_known_methods`
/// below keeps them honest.
const KNOWN_METHODS: [&str; 4] = ["ping", "login_response", "sync", "spawn"];

/// Result of decoding one inbound frame.
///
/// `Unknown` is a first-class outcome, not an error: the protocol drops
/// frames with unrecognized methods silently.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Rpc(ServerRpc),
    Unknown(String),
}

/// Decodes one inbound text frame.
///
/// A frame that is not a JSON envelope at all, or that carries a
/// malformed payload for a recognized method, is an error.
pub fn decode_frame(text: &str) -> anyhow::Result<InboundFrame> {
    let header: Header = serde_json::from_str(text).context("decode envelope header")?;
    if KNOWN_METHODS.contains(&header.method.as_str()) {
        let rpc = serde_json::from_str(text)
            .with_context(|| format!("decode `{}` payload", header.method))?;
        Ok(InboundFrame::Rpc(rpc))
    } else {
        Ok(InboundFrame::Unknown(header.method))
    }
}

/// Serializes one outbound frame to its wire text.
pub fn encode_frame<T: Serialize>(msg: &T) -> anyhow::Result<String> {
    serde_json::to_string(msg).context("serialize frame")
}
