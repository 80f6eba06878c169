//! Signaling wire contract shared by the relay server and its clients.
//!
//! Inbound frames are opaque JSON objects. Outbound frames are either the
//! inbound object stamped with [`FROM_FIELD`], or a [`PeerLeftNotice`].

use serde::{Deserialize, Serialize};

/// Reserved field carrying the sender's display identity on every outbound frame.
pub const FROM_FIELD: &str = "from";

/// Field carrying the message kind on system-generated frames.
pub const TYPE_FIELD: &str = "type";

/// `type` value of the notice sent when a peer's connection ends.
pub const PEER_LEFT: &str = "peer-left";

/// Identity used when the client does not supply one.
pub const ANONYMOUS_IDENTITY: &str = "anon";

/// Query parameters accepted on the signaling upgrade request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ConnectParams {
    /// The room to join. Empty values count as absent.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref().filter(|r| !r.is_empty())
    }

    /// The display identity, falling back to [`ANONYMOUS_IDENTITY`].
    pub fn identity(&self) -> &str {
        self.user
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_IDENTITY)
    }
}

/// Departure notice: `{"type":"peer-left","from":"<identity>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerLeftNotice {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
}

impl PeerLeftNotice {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            kind: PEER_LEFT.to_string(),
            from: from.into(),
        }
    }
}
