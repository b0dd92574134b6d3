//! Jolokia POST-mode protocol codec
//!
//! Request/response shapes for the broker's management endpoint, plus the
//! MBean-name construction and parsing the hierarchical addressing scheme
//! requires. The broker domain is `org.apache.activemq`; a broker object is
//! `type=Broker,brokerName=<identity>` and destinations hang off it as
//! `destinationType=<Queue|Topic>,destinationName=<name>`.

use crate::protocol::DestinationType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JMX domain all broker management objects live under
pub const JMX_DOMAIN: &str = "org.apache.activemq";

/// Wildcard pattern matching any broker object in the domain
pub const BROKER_WILDCARD: &str = "org.apache.activemq:type=Broker,brokerName=*";

/// Default broker identity tried when discovery finds nothing better
pub const DEFAULT_BROKER_NAME: &str = "localhost";

/// Prefix of broker-internal advisory destinations, excluded from listings
pub const ADVISORY_PREFIX: &str = "ActiveMQ.Advisory.";

/// One Jolokia request (POST mode)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JolokiaRequest {
    Read {
        mbean: String,
    },
    Exec {
        mbean: String,
        operation: String,
        arguments: Vec<Value>,
    },
    Search {
        mbean: String,
    },
    List {
        path: String,
    },
}

impl JolokiaRequest {
    pub fn read<S: Into<String>>(mbean: S) -> Self {
        Self::Read {
            mbean: mbean.into(),
        }
    }

    pub fn exec<M: Into<String>, O: Into<String>>(mbean: M, operation: O) -> Self {
        Self::Exec {
            mbean: mbean.into(),
            operation: operation.into(),
            arguments: Vec::new(),
        }
    }

    pub fn search<S: Into<String>>(mbean: S) -> Self {
        Self::Search {
            mbean: mbean.into(),
        }
    }

    pub fn list<S: Into<String>>(path: S) -> Self {
        Self::List { path: path.into() }
    }

    /// Short operation label for error context
    pub fn describe(&self) -> String {
        match self {
            Self::Read { mbean } => format!("read {mbean}"),
            Self::Exec {
                mbean, operation, ..
            } => format!("exec {operation} on {mbean}"),
            Self::Search { mbean } => format!("search {mbean}"),
            Self::List { path } => format!("list {path}"),
        }
    }
}

/// Jolokia response envelope. Body status 200 means success regardless of
/// the HTTP layer; an absent value means "no data", never an error.
#[derive(Debug, Clone, Deserialize)]
pub struct JolokiaResponse {
    pub status: u16,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JolokiaResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("jolokia status {}", self.status))
    }
}

/// MBean name of the broker object for a given identity
pub fn broker_mbean(broker_name: &str) -> String {
    format!("{JMX_DOMAIN}:type=Broker,brokerName={broker_name}")
}

/// MBean name of one destination under a broker
pub fn destination_mbean(
    broker_name: &str,
    destination_type: DestinationType,
    name: &str,
) -> String {
    format!(
        "{},destinationType={},destinationName={}",
        broker_mbean(broker_name),
        destination_type.mbean_value(),
        name
    )
}

/// Wildcard matching every destination of one type under a broker
pub fn destination_wildcard(broker_name: &str, destination_type: DestinationType) -> String {
    destination_mbean(broker_name, destination_type, "*")
}

/// Extract the value of one `key=value` component from an MBean name
///
/// MBean names are `domain:key1=v1,key2=v2,...`; returns `None` when the key
/// is absent.
pub fn extract_key_component(mbean: &str, key: &str) -> Option<String> {
    let properties = mbean.split_once(':').map(|(_, p)| p).unwrap_or(mbean);
    properties.split(',').find_map(|component| {
        let (k, v) = component.split_once('=')?;
        (k.trim() == key).then(|| v.trim().to_string())
    })
}

/// Whether a destination name is a broker-internal advisory destination
pub fn is_advisory(name: &str) -> bool {
    name.starts_with(ADVISORY_PREFIX)
}
