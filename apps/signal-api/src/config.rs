/// Signal API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Frames each connection may have queued before it is treated as
    /// unreachable for further fan-out.
    pub outbound_capacity: usize,
    /// Largest inbound WebSocket message accepted, in bytes. A client that
    /// sends more is disconnected and its room sees it leave.
    pub max_message_bytes: usize,
}

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; missing or unparseable values use the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parsed(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
            outbound_capacity: parsed(&lookup, "RELAY_OUTBOUND_CAPACITY")
                .unwrap_or(DEFAULT_OUTBOUND_CAPACITY)
                .max(1),
            max_message_bytes: parsed(&lookup, "RELAY_MAX_MESSAGE_BYTES")
                .unwrap_or(DEFAULT_MAX_MESSAGE_BYTES),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}
