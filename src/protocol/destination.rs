//! Destination string parsing
//!
//! Callers address broker destinations with an optional textual prefix:
//! `/queue/`, `queue/`, `/topic/`, or `topic/`. A string with no recognized
//! prefix is a queue. Parsing is total: it never fails, whatever the input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination kind on the remote broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    Queue,
    Topic,
}

impl DestinationType {
    /// Query-parameter value used by the broker's message endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationType::Queue => "queue",
            DestinationType::Topic => "topic",
        }
    }

    /// MBean `destinationType` component value
    pub fn mbean_value(&self) -> &'static str {
        match self {
            DestinationType::Queue => "Queue",
            DestinationType::Topic => "Topic",
        }
    }
}

impl fmt::Display for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed destination: type plus bare name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub destination_type: DestinationType,
    pub name: String,
}

const QUEUE_PREFIXES: [&str; 2] = ["/queue/", "queue/"];
const TOPIC_PREFIXES: [&str; 2] = ["/topic/", "topic/"];

impl Destination {
    /// Parse a destination string into type and bare name. The first prefix
    /// decides the type; the name is fully stripped.
    pub fn parse(destination: &str) -> Self {
        for prefix in QUEUE_PREFIXES {
            if destination.starts_with(prefix) {
                return Self {
                    destination_type: DestinationType::Queue,
                    name: clean_name(destination),
                };
            }
        }
        for prefix in TOPIC_PREFIXES {
            if destination.starts_with(prefix) {
                return Self {
                    destination_type: DestinationType::Topic,
                    name: clean_name(destination),
                };
            }
        }
        Self {
            destination_type: DestinationType::Queue,
            name: destination.to_string(),
        }
    }
}

/// Strip every recognized destination prefix, returning the bare name
///
/// Idempotent: applying it to its own output is a no-op.
pub fn clean_name(destination: &str) -> String {
    let mut name = destination;
    while let Some(stripped) = QUEUE_PREFIXES
        .iter()
        .chain(TOPIC_PREFIXES.iter())
        .find_map(|prefix| name.strip_prefix(prefix))
    {
        name = stripped;
    }
    name.to_string()
}
