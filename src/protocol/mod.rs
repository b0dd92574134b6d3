//! Destination addressing and caller-facing value types

pub mod destination;
pub mod messages;

pub use destination::{clean_name, Destination, DestinationType};
pub use messages::{
    BrokerHealth, BrokerInfo, BrokerStats, ConnectionInfo, ConnectionStats, ConnectionStatus,
    ConnectionTestReport, ExportedConnection, HealthStatus, ImportOutcome, Message, QueueInfo,
    SendReceipt, SystemStatus, TopicInfo, UsagePair,
};
