//! Fan-out of signaling payloads to the other members of the sender's room.
//!
//! Delivery is best effort: each recipient gets one non-blocking enqueue
//! attempt. Recipients whose queue is full or whose connection is gone are
//! skipped and counted, never retried.

use super::connection::{Frame, PeerHandle, Undeliverable};
use super::messages::{relayed_frame, Payload};
use super::registry::RoomRegistry;

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    /// Recipients whose queue was full.
    pub lagging: usize,
    /// Recipients whose connection was already closed.
    pub closed: usize,
}

impl Delivery {
    pub fn skipped(&self) -> usize {
        self.lagging + self.closed
    }
}

/// Send `frame` to every peer except `sender`.
pub(crate) fn fan_out(sender: &PeerHandle, peers: &[PeerHandle], frame: &Frame) -> Delivery {
    let mut delivery = Delivery::default();
    for peer in peers.iter().filter(|p| p.id() != sender.id()) {
        match peer.try_deliver(frame) {
            Ok(()) => delivery.delivered += 1,
            Err(reason) => {
                tracing::debug!(
                    from = %sender.id(),
                    to = %peer.id(),
                    ?reason,
                    "skipping undeliverable peer"
                );
                match reason {
                    Undeliverable::Full => delivery.lagging += 1,
                    Undeliverable::Closed => delivery.closed += 1,
                }
            }
        }
    }
    delivery
}

/// Relay a payload from `sender` to the rest of its room, stamped with the
/// sender's identity. A sender with no room relays nothing.
pub fn relay(registry: &RoomRegistry, sender: &PeerHandle, payload: Payload) -> Delivery {
    let Some(room_id) = registry.room_of(sender.id()) else {
        return Delivery::default();
    };

    let peers = registry.members_of(&room_id);
    let frame = relayed_frame(payload, sender.identity());
    fan_out(sender, &peers, &frame)
}
