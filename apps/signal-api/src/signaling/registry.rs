//! Room registry: authoritative room membership for all signaling connections.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use utoipa::ToSchema;

use super::connection::{ConnectionId, PeerHandle};

struct RoomMember {
    peer: PeerHandle,
    joined_at: DateTime<Utc>,
}

struct Room {
    created_at: DateTime<Utc>,
    members: HashMap<ConnectionId, RoomMember>,
}

impl Room {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            members: HashMap::new(),
        }
    }

    fn peers(&self) -> Vec<PeerHandle> {
        self.members.values().map(|m| m.peer.clone()).collect()
    }

    fn summary(&self, room_id: &str) -> RoomSummary {
        let mut members: Vec<MemberSummary> = self
            .members
            .values()
            .map(|m| MemberSummary {
                connection_id: m.peer.id().to_string(),
                identity: m.peer.identity().to_string(),
                joined_at: m.joined_at,
            })
            .collect();
        members.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });

        RoomSummary {
            room_id: room_id.to_string(),
            created_at: self.created_at,
            member_count: members.len(),
            members,
        }
    }
}

/// Point-in-time view of a room, as served by the introspection endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummary {
    pub room_id: String,
    pub created_at: DateTime<Utc>,
    pub member_count: usize,
    pub members: Vec<MemberSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    pub connection_id: String,
    pub identity: String,
    pub joined_at: DateTime<Utc>,
}

/// Result of removing a connection from its room.
#[derive(Debug)]
pub struct Departure {
    pub room_id: String,
    /// Members still in the room, captured under the same lock as the removal.
    pub remaining: Vec<PeerHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// The connection already occupies a room; rejoining needs a new connection.
    AlreadyJoined { room_id: String },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::AlreadyJoined { room_id } => {
                write!(f, "connection is already a member of room {room_id}")
            }
        }
    }
}

impl std::error::Error for JoinError {}

/// Process-wide mapping of room id to member connections.
///
/// `rooms` holds the member sets, `memberships` maps each joined connection
/// back to its room. A room entry exists only while it has members: creation
/// and deletion happen inside the shard lock that guards the member set.
/// Lock order is `memberships` then `rooms`; nothing takes them the other way.
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
    memberships: DashMap<ConnectionId, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room if needed.
    ///
    /// Fails without touching the registry if the connection is already a
    /// member of any room.
    pub fn join(&self, peer: &PeerHandle, room_id: &str) -> Result<(), JoinError> {
        match self.memberships.entry(peer.id().clone()) {
            Entry::Occupied(current) => Err(JoinError::AlreadyJoined {
                room_id: current.get().clone(),
            }),
            Entry::Vacant(slot) => {
                let mut room = self
                    .rooms
                    .entry(room_id.to_string())
                    .or_insert_with(Room::new);
                room.members.insert(
                    peer.id().clone(),
                    RoomMember {
                        peer: peer.clone(),
                        joined_at: Utc::now(),
                    },
                );
                drop(room);
                slot.insert(room_id.to_string());
                Ok(())
            }
        }
    }

    /// Remove a connection from whatever room it occupies.
    ///
    /// Deletes the room when its last member leaves. Returns `None` if the
    /// connection was not in a room.
    pub fn leave(&self, id: &ConnectionId) -> Option<Departure> {
        let (_, room_id) = self.memberships.remove(id)?;

        let remaining = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut room) => {
                room.get_mut().members.remove(id);
                if room.get().members.is_empty() {
                    room.remove();
                    Vec::new()
                } else {
                    room.get().peers()
                }
            }
            Entry::Vacant(_) => Vec::new(),
        };

        Some(Departure { room_id, remaining })
    }

    /// Snapshot of a room's members. Empty if the room does not exist.
    pub fn members_of(&self, room_id: &str) -> Vec<PeerHandle> {
        self.rooms
            .get(room_id)
            .map(|room| room.peers())
            .unwrap_or_default()
    }

    /// The room a connection currently occupies.
    pub fn room_of(&self, id: &ConnectionId) -> Option<String> {
        self.memberships.get(id).map(|room| room.value().clone())
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of connections currently joined to a room.
    pub fn connection_count(&self) -> usize {
        self.memberships.len()
    }

    pub fn summary(&self, room_id: &str) -> Option<RoomSummary> {
        self.rooms.get(room_id).map(|room| room.summary(room_id))
    }

    /// Summaries of every room, ordered by room id.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|entry| entry.value().summary(entry.key()))
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
