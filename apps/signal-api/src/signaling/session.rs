//! Per-connection signaling session and its lifecycle.

use super::connection::PeerHandle;
use super::messages::parse_inbound;
use super::notifier::announce_departure;
use super::registry::RoomRegistry;
use super::relay::{relay, Delivery};

/// Lifecycle of one connection.
///
/// `Connecting → Joined(room) → Leaving → Closed`, or
/// `Connecting → Unjoined → Closed` when no room was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Unjoined,
    Joined(String),
    Leaving,
    Closed,
}

/// State for a single signaling connection.
pub struct SignalingSession {
    peer: PeerHandle,
    state: ConnectionState,
}

impl SignalingSession {
    /// A freshly upgraded connection that has not been placed in a room yet.
    pub fn new(peer: PeerHandle) -> Self {
        Self {
            peer,
            state: ConnectionState::Connecting,
        }
    }

    /// Accept a connection and join the requested room, if any.
    pub fn open(peer: PeerHandle, room: Option<&str>, registry: &RoomRegistry) -> Self {
        let mut session = Self::new(peer);
        session.accept(room, registry);
        session
    }

    /// Leave `Connecting`: join `room` if one was requested, otherwise stay
    /// unjoined for the life of the connection. No-op in any other state.
    pub fn accept(&mut self, room: Option<&str>, registry: &RoomRegistry) {
        if self.state != ConnectionState::Connecting {
            return;
        }

        self.state = match room {
            Some(room_id) => match registry.join(&self.peer, room_id) {
                Ok(()) => ConnectionState::Joined(room_id.to_string()),
                Err(err) => {
                    tracing::warn!(connection_id = %self.peer.id(), %err, "join rejected");
                    ConnectionState::Unjoined
                }
            },
            None => ConnectionState::Unjoined,
        };
    }

    pub fn peer(&self) -> &PeerHandle {
        &self.peer
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Handle one inbound text frame.
    ///
    /// Malformed frames are dropped and return `None`. Frames from a
    /// connection that is not in a room parse but reach nobody.
    pub fn handle_inbound(&self, registry: &RoomRegistry, text: &str) -> Option<Delivery> {
        let payload = match parse_inbound(text) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(connection_id = %self.peer.id(), %err, "dropping malformed message");
                return None;
            }
        };

        match self.state {
            ConnectionState::Joined(_) => Some(relay(registry, &self.peer, payload)),
            _ => Some(Delivery::default()),
        }
    }

    /// Leave the room (announcing the departure) and close the session.
    /// Calling it again is a no-op.
    pub fn close(&mut self, registry: &RoomRegistry) -> Delivery {
        let delivery = match self.state {
            ConnectionState::Joined(_) => {
                self.state = ConnectionState::Leaving;
                tracing::debug!(connection_id = %self.peer.id(), state = ?self.state, "leaving room");
                announce_departure(registry, &self.peer)
            }
            _ => Delivery::default(),
        };
        self.state = ConnectionState::Closed;
        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_connecting_until_accepted() {
        let registry = RoomRegistry::new();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let mut session = SignalingSession::new(peer);

        assert_eq!(session.state(), &ConnectionState::Connecting);
        assert!(registry.room_of(session.peer().id()).is_none());

        session.accept(Some("abc"), &registry);
        assert_eq!(session.state(), &ConnectionState::Joined("abc".into()));

        // Accepting again cannot move the connection to another room.
        session.accept(Some("xyz"), &registry);
        assert_eq!(session.state(), &ConnectionState::Joined("abc".into()));
        assert!(!registry.contains_room("xyz"));
    }

    #[test]
    fn closing_before_accept_goes_straight_to_closed() {
        let registry = RoomRegistry::new();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let mut session = SignalingSession::new(peer);

        assert_eq!(session.close(&registry), Delivery::default());
        assert_eq!(session.state(), &ConnectionState::Closed);

        session.accept(Some("abc"), &registry);
        assert_eq!(session.state(), &ConnectionState::Closed);
        assert!(!registry.contains_room("abc"));
    }

    #[test]
    fn open_with_room_joins() {
        let registry = RoomRegistry::new();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let session = SignalingSession::open(peer, Some("abc"), &registry);

        assert_eq!(session.state(), &ConnectionState::Joined("abc".into()));
        assert_eq!(
            registry.room_of(session.peer().id()).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn open_without_room_stays_unjoined_and_silent() {
        let registry = RoomRegistry::new();
        let (y, mut y_rx) = PeerHandle::new("y", 8);
        registry.join(&y, "abc").unwrap();

        let (peer, _rx) = PeerHandle::new("x", 8);
        let mut session = SignalingSession::open(peer, None, &registry);
        assert_eq!(session.state(), &ConnectionState::Unjoined);

        let delivery = session.handle_inbound(&registry, r#"{"type":"offer"}"#);
        assert_eq!(delivery, Some(Delivery::default()));
        assert_eq!(session.close(&registry), Delivery::default());
        assert_eq!(session.state(), &ConnectionState::Closed);
        assert!(y_rx.try_recv().is_err());
        assert_eq!(registry.connection_count(), 1);
    }

    #[test]
    fn malformed_message_is_dropped_without_side_effects() {
        let registry = RoomRegistry::new();
        let (y, mut y_rx) = PeerHandle::new("y", 8);
        registry.join(&y, "abc").unwrap();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let session = SignalingSession::open(peer, Some("abc"), &registry);

        assert_eq!(session.handle_inbound(&registry, "{not json"), None);
        assert_eq!(session.handle_inbound(&registry, "[1]"), None);

        assert!(y_rx.try_recv().is_err());
        assert_eq!(registry.members_of("abc").len(), 2);
        assert_eq!(session.state(), &ConnectionState::Joined("abc".into()));
    }

    #[test]
    fn joined_session_relays() {
        let registry = RoomRegistry::new();
        let (y, mut y_rx) = PeerHandle::new("y", 8);
        registry.join(&y, "abc").unwrap();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let session = SignalingSession::open(peer, Some("abc"), &registry);

        let delivery = session
            .handle_inbound(&registry, r#"{"type":"answer","sdp":"v=0"}"#)
            .unwrap();
        assert_eq!(delivery.delivered, 1);

        let value: serde_json::Value = serde_json::from_str(&y_rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "type": "answer", "sdp": "v=0", "from": "x" })
        );
    }

    #[test]
    fn close_announces_once_and_is_terminal() {
        let registry = RoomRegistry::new();
        let (y, mut y_rx) = PeerHandle::new("y", 8);
        registry.join(&y, "abc").unwrap();
        let (peer, _rx) = PeerHandle::new("x", 8);
        let mut session = SignalingSession::open(peer, Some("abc"), &registry);

        assert_eq!(session.close(&registry).delivered, 1);
        assert_eq!(session.state(), &ConnectionState::Closed);
        assert_eq!(session.close(&registry), Delivery::default());

        assert!(y_rx.try_recv().is_ok());
        assert!(y_rx.try_recv().is_err());
        assert!(registry.room_of(session.peer().id()).is_none());

        // A closed session relays nothing.
        assert_eq!(
            session.handle_inbound(&registry, r#"{"type":"offer"}"#),
            Some(Delivery::default())
        );
    }
}
