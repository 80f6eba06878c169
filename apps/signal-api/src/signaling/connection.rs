//! Opaque per-connection handle used by the registry and the router.

use std::fmt;
use std::sync::Arc;

use mentorconnect_common::id::{self, prefix};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// A serialized outbound text frame, shared between all recipients of a fan-out.
pub type Frame = Arc<str>;

/// Unique identifier for one signaling connection (`conn_` prefixed ULID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(id::prefixed_ulid(prefix::CONNECTION))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a frame could not be handed to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Undeliverable {
    /// The peer's outbound queue is at capacity.
    Full,
    /// The peer's connection has stopped accepting frames.
    Closed,
}

/// Cloneable handle to a connected peer.
///
/// Holds the identity and the sending half of the peer's bounded outbound
/// queue. The connection task owns the receiving half and writes queued
/// frames to the socket.
#[derive(Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    identity: Arc<str>,
    tx: mpsc::Sender<Frame>,
}

impl PeerHandle {
    /// Create a handle and the receiver its connection task drains.
    pub fn new(identity: &str, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::generate(),
            identity: Arc::from(identity),
            tx,
        };
        (handle, rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whether the connection still accepts frames.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Enqueue a frame without waiting.
    pub fn try_deliver(&self, frame: &Frame) -> Result<(), Undeliverable> {
        self.tx.try_send(frame.clone()).map_err(|err| match err {
            TrySendError::Full(_) => Undeliverable::Full,
            TrySendError::Closed(_) => Undeliverable::Closed,
        })
    }
}

impl fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerHandle")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("open", &self.is_open())
            .finish()
    }
}
