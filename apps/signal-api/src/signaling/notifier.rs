//! Departure announcements for connections that are going away.

use super::connection::PeerHandle;
use super::messages::peer_left_frame;
use super::registry::RoomRegistry;
use super::relay::{fan_out, Delivery};

/// Deregister `peer` and tell the rest of its room that it left.
///
/// The peer is removed before the notice goes out, and the notice is sent to
/// the member snapshot taken with that removal, so nobody who receives it can
/// still find the peer in the room. No-op if the peer is not in a room.
pub fn announce_departure(registry: &RoomRegistry, peer: &PeerHandle) -> Delivery {
    let Some(departure) = registry.leave(peer.id()) else {
        return Delivery::default();
    };

    let delivery = fan_out(peer, &departure.remaining, &peer_left_frame(peer.identity()));

    tracing::info!(
        connection_id = %peer.id(),
        room_id = %departure.room_id,
        notified = delivery.delivered,
        skipped = delivery.skipped(),
        "peer left room"
    );

    delivery
}
