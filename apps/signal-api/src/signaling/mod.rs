//! Room-scoped WebRTC signaling relay.

pub mod connection;
pub mod messages;
pub mod notifier;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

pub use connection::{ConnectionId, Frame, PeerHandle, Undeliverable};
pub use notifier::announce_departure;
pub use registry::{JoinError, RoomRegistry};
pub use relay::{relay, Delivery};
