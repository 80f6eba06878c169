//! Inbound parsing and outbound frame construction.

use std::sync::Arc;

use mentorconnect_common::protocol::{PeerLeftNotice, FROM_FIELD, TYPE_FIELD};
use serde_json::{Map, Value};

use super::connection::Frame;

/// An inbound signaling payload. The relay never looks inside it.
pub type Payload = Map<String, Value>;

/// Parse an inbound frame as a JSON object.
///
/// Anything else, including valid JSON that is not an object, is rejected.
pub fn parse_inbound(text: &str) -> Result<Payload, serde_json::Error> {
    serde_json::from_str(text)
}

/// Stamp a payload with the sender's identity. Overwrites any `from` the
/// client put there.
pub fn relayed_frame(mut payload: Payload, from: &str) -> Frame {
    payload.insert(FROM_FIELD.to_string(), Value::String(from.to_string()));
    Arc::from(Value::Object(payload).to_string())
}

pub fn peer_left_frame(from: &str) -> Frame {
    let notice = PeerLeftNotice::new(from);
    let mut fields = Map::new();
    fields.insert(TYPE_FIELD.to_string(), Value::String(notice.kind));
    fields.insert(FROM_FIELD.to_string(), Value::String(notice.from));
    Arc::from(Value::Object(fields).to_string())
}
