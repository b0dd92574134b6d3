//! HTTP client for one broker endpoint
//!
//! Owns a single authenticated session against one broker address and
//! translates abstract messaging operations onto the broker's two HTTP
//! endpoint families: the per-destination message API
//! (`/api/message/<name>`) and the Jolokia management API (`/api/jolokia`).
//!
//! The broker's management namespace is addressed by a runtime-assigned
//! broker name that is not reliably discoverable with a single call shape;
//! [`BrokerClient::broker_name`] runs a multi-step fallback and caches the
//! result for the lifetime of the client.

pub mod jolokia;

use crate::config::ConnectionConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{
    clean_name, BrokerHealth, BrokerInfo, BrokerStats, Destination, DestinationType, Message,
    QueueInfo, SendReceipt, TopicInfo, UsagePair,
};
use jolokia::{JolokiaRequest, JolokiaResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Options for a single consume request
#[derive(Debug, Clone, Default)]
pub struct ConsumeOptions {
    /// Broker-side receive timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Stable consumer identity across polls
    pub client_id: Option<String>,
    /// JMS-style message selector
    pub selector: Option<String>,
}

/// One authenticated HTTP session bound to one broker address
#[derive(Debug)]
pub struct BrokerClient {
    config: ConnectionConfig,
    base_url: Url,
    http: reqwest::Client,
    connected: AtomicBool,
    broker_name: RwLock<Option<String>>,
}

impl BrokerClient {
    /// Build a client for one broker endpoint. Fails fast on an invalid
    /// config; performs no network I/O.
    pub fn new(config: ConnectionConfig) -> GatewayResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url())
            .map_err(|e| GatewayError::invalid_argument(format!("invalid broker address: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                GatewayError::remote("build HTTP client", None, e.to_string())
            })?;

        Ok(Self {
            config,
            base_url,
            http,
            connected: AtomicBool::new(false),
            broker_name: RwLock::new(None),
        })
    }

    /// Validate reachability and credentials with one lightweight management
    /// read. Idempotent: connecting while connected is a no-op.
    pub async fn connect(&self) -> GatewayResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        let broker_name = self.broker_name().await?;
        let request = JolokiaRequest::read(jolokia::broker_mbean(&broker_name));
        let response = self.jolokia(&request).await?;
        if !response.is_success() {
            return Err(GatewayError::remote(
                format!("connect to {}", self.config.base_url()),
                Some(response.status),
                response.error_message(),
            ));
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(broker = %self.config.base_url(), broker_name = %broker_name, "connected to broker");
        Ok(())
    }

    /// Drop the connected state. Idempotent and always succeeds locally;
    /// the remote session is stateless so there is nothing to tear down.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!(broker = %self.config.base_url(), "disconnected from broker");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn ensure_connected(&self) -> GatewayResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(GatewayError::NotConnected)
        }
    }

    /// Resolve the broker's management identity, caching the result.
    ///
    /// Fallback chain: wildcard search, well-known `localhost` object, full
    /// registry listing, then the literal `localhost`. Each step degrades
    /// gracefully; the chain itself cannot fail once the endpoint answers.
    pub async fn broker_name(&self) -> GatewayResult<String> {
        if let Some(name) = self.broker_name.read().await.clone() {
            return Ok(name);
        }

        let discovered = self.discover_broker_name().await?;
        let mut cache = self.broker_name.write().await;
        // Another caller may have raced the discovery; first write wins.
        if let Some(existing) = cache.clone() {
            return Ok(existing);
        }
        *cache = Some(discovered.clone());
        Ok(discovered)
    }

    async fn discover_broker_name(&self) -> GatewayResult<String> {
        // Step 1: wildcard search over broker objects
        let search = JolokiaRequest::search(jolokia::BROKER_WILDCARD);
        match self.jolokia(&search).await {
            Ok(response) if response.is_success() => {
                if let Some(name) = response
                    .value
                    .as_ref()
                    .and_then(Value::as_array)
                    .and_then(|mbeans| mbeans.first())
                    .and_then(Value::as_str)
                    .and_then(|mbean| jolokia::extract_key_component(mbean, "brokerName"))
                {
                    debug!(broker_name = %name, "discovered broker name via wildcard search");
                    return Ok(name);
                }
            }
            Ok(response) => {
                debug!(status = response.status, "wildcard broker search failed")
            }
            Err(e) => debug!(error = %e, "wildcard broker search failed"),
        }

        // Step 2: the well-known default object
        let probe = JolokiaRequest::read(jolokia::broker_mbean(jolokia::DEFAULT_BROKER_NAME));
        if let Ok(response) = self.jolokia(&probe).await {
            if response.is_success() && response.value.is_some() {
                debug!("discovered broker name via default-identity probe");
                return Ok(jolokia::DEFAULT_BROKER_NAME.to_string());
            }
        }

        // Step 3: full registry listing
        let list = JolokiaRequest::list(jolokia::JMX_DOMAIN);
        if let Ok(response) = self.jolokia(&list).await {
            if response.is_success() {
                if let Some(name) = response
                    .value
                    .as_ref()
                    .and_then(Value::as_object)
                    .and_then(|entries| {
                        entries
                            .keys()
                            .find_map(|key| jolokia::extract_key_component(key, "brokerName"))
                    })
                {
                    debug!(broker_name = %name, "discovered broker name via registry listing");
                    return Ok(name);
                }
            }
        }

        warn!(
            broker = %self.config.base_url(),
            "broker name discovery exhausted all strategies, assuming '{}'",
            jolokia::DEFAULT_BROKER_NAME
        );
        Ok(jolokia::DEFAULT_BROKER_NAME.to_string())
    }

    /// Issue one Jolokia request. HTTP-layer failures are errors; a body
    /// with a non-200 Jolokia status is returned to the caller to interpret
    /// (discovery and degraded reads depend on seeing it).
    async fn jolokia(&self, request: &JolokiaRequest) -> GatewayResult<JolokiaResponse> {
        let url = self.endpoint("api/jolokia")?;
        let mut builder = self.http.post(url).json(request);
        builder = self.apply_auth(builder);

        let response = builder.send().await.map_err(|e| {
            GatewayError::remote(request.describe(), None, e.to_string())
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(JolokiaResponse {
                status: 200,
                value: None,
                error: None,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::remote(
                request.describe(),
                Some(status.as_u16()),
                body,
            ));
        }

        let body = response.text().await.map_err(|e| {
            GatewayError::remote(request.describe(), Some(status.as_u16()), e.to_string())
        })?;
        if body.trim().is_empty() {
            return Ok(JolokiaResponse {
                status: 200,
                value: None,
                error: None,
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            GatewayError::remote(
                request.describe(),
                Some(status.as_u16()),
                format!("malformed management response: {e}"),
            )
        })
    }

    /// Jolokia call where a non-200 body status is itself a failure
    async fn jolokia_ok(&self, request: &JolokiaRequest) -> GatewayResult<JolokiaResponse> {
        let response = self.jolokia(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(GatewayError::remote(
                request.describe(),
                Some(response.status),
                response.error_message(),
            ))
        }
    }

    /// Enqueue one message on a destination. Textual bodies pass through;
    /// anything else is JSON-encoded. Extra header entries travel as
    /// additional form fields.
    pub async fn send_message(
        &self,
        destination: &str,
        body: &Value,
        headers: &HashMap<String, String>,
    ) -> GatewayResult<SendReceipt> {
        self.ensure_connected()?;
        let parsed = Destination::parse(destination);
        let context = format!("send to {} '{}'", parsed.destination_type, parsed.name);

        let payload = match body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        let mut form: Vec<(String, String)> = vec![("body".to_string(), payload)];
        for (key, value) in headers {
            form.push((key.clone(), value.clone()));
        }

        let mut url = self.message_endpoint(&parsed.name)?;
        url.query_pairs_mut()
            .append_pair("type", parsed.destination_type.as_str());

        let mut builder = self.http.post(url).form(&form);
        builder = self.apply_auth(builder);
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::remote(context.clone(), None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::remote(context, Some(status.as_u16()), text));
        }

        debug!(destination = %parsed.name, kind = %parsed.destination_type, "message sent");
        Ok(SendReceipt {
            success: true,
            status: status.as_u16(),
        })
    }

    /// Receive one message from a destination. `Ok(None)` means the
    /// destination had nothing to deliver within the timeout.
    pub async fn consume_message(
        &self,
        destination: &str,
        options: &ConsumeOptions,
    ) -> GatewayResult<Option<Message>> {
        self.ensure_connected()?;
        let parsed = Destination::parse(destination);
        self.receive_one(&parsed, options, false).await
    }

    /// Collect up to `limit` messages from a queue without consuming them.
    ///
    /// The remote protocol has no batch browse, so this iterates
    /// single-message requests; it stops at `limit` even if the broker
    /// never signals emptiness.
    pub async fn browse_messages(
        &self,
        queue_name: &str,
        limit: usize,
    ) -> GatewayResult<Vec<Message>> {
        self.ensure_connected()?;
        let parsed = Destination {
            destination_type: DestinationType::Queue,
            name: clean_name(queue_name),
        };

        let mut messages = Vec::new();
        for _ in 0..limit {
            match self.receive_one(&parsed, &ConsumeOptions::default(), true).await? {
                Some(message) => messages.push(message),
                None => break,
            }
        }
        debug!(queue = %parsed.name, count = messages.len(), "browsed queue");
        Ok(messages)
    }

    async fn receive_one(
        &self,
        destination: &Destination,
        options: &ConsumeOptions,
        browse: bool,
    ) -> GatewayResult<Option<Message>> {
        let verb = if browse { "browse" } else { "consume" };
        let context = format!(
            "{verb} from {} '{}'",
            destination.destination_type, destination.name
        );

        let mut url = self.message_endpoint(&destination.name)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("type", destination.destination_type.as_str());
            query.append_pair("oneShot", "true");
            if browse {
                query.append_pair("browse", "true");
            }
            if let Some(timeout) = options.timeout_ms {
                query.append_pair("timeout", &timeout.to_string());
            }
            if let Some(client_id) = &options.client_id {
                query.append_pair("clientId", client_id);
            }
            if let Some(selector) = &options.selector {
                query.append_pair("selector", selector);
            }
        }

        let mut builder = self.http.get(url);
        builder = self.apply_auth(builder);
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::remote(context.clone(), None, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::remote(context, Some(status.as_u16()), text));
        }

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(text) = value.to_str() {
                headers.insert(name.to_string(), text.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::remote(context, Some(status.as_u16()), e.to_string()))?;
        if body.is_empty() {
            return Ok(None);
        }

        Ok(Some(Message {
            headers,
            body,
            received_at: chrono::Utc::now(),
        }))
    }

    /// Invoke the management purge action on a queue, returning the purged
    /// message count the broker reports (0 when it reports none).
    pub async fn purge_queue(&self, queue_name: &str) -> GatewayResult<u64> {
        self.ensure_connected()?;
        let name = clean_name(queue_name);
        let broker_name = self.broker_name().await?;
        let mbean = jolokia::destination_mbean(&broker_name, DestinationType::Queue, &name);
        let response = self.jolokia_ok(&JolokiaRequest::exec(mbean, "purge")).await?;

        let purged = response.value.as_ref().and_then(Value::as_u64).unwrap_or(0);
        info!(queue = %name, purged, "queue purged");
        Ok(purged)
    }

    /// Read one queue's management counters. A failed read degrades to a
    /// zeroed record carrying the error, because callers treat a management
    /// miss as "absent/empty", not as a failure.
    pub async fn get_queue_info(&self, queue_name: &str) -> GatewayResult<QueueInfo> {
        self.ensure_connected()?;
        let name = clean_name(queue_name);
        let broker_name = self.broker_name().await?;
        let mbean = jolokia::destination_mbean(&broker_name, DestinationType::Queue, &name);

        match self.jolokia(&JolokiaRequest::read(mbean)).await {
            Ok(response) if response.is_success() && response.value.is_some() => {
                let value = response.value.unwrap_or(Value::Null);
                Ok(QueueInfo {
                    name,
                    size: u64_attr(&value, "QueueSize"),
                    consumer_count: u64_attr(&value, "ConsumerCount"),
                    enqueue_count: u64_attr(&value, "EnqueueCount"),
                    dequeue_count: u64_attr(&value, "DequeueCount"),
                    error: None,
                })
            }
            Ok(response) => Ok(QueueInfo::degraded(name, response.error_message())),
            Err(e) => Ok(QueueInfo::degraded(name, e.to_string())),
        }
    }

    /// Read one topic's management counters, degrading like
    /// [`Self::get_queue_info`].
    pub async fn get_topic_info(&self, topic_name: &str) -> GatewayResult<TopicInfo> {
        self.ensure_connected()?;
        let name = clean_name(topic_name);
        let broker_name = self.broker_name().await?;
        let mbean = jolokia::destination_mbean(&broker_name, DestinationType::Topic, &name);

        match self.jolokia(&JolokiaRequest::read(mbean)).await {
            Ok(response) if response.is_success() && response.value.is_some() => {
                let value = response.value.unwrap_or(Value::Null);
                Ok(TopicInfo {
                    name,
                    consumer_count: u64_attr(&value, "ConsumerCount"),
                    enqueue_count: u64_attr(&value, "EnqueueCount"),
                    dequeue_count: u64_attr(&value, "DequeueCount"),
                    error: None,
                })
            }
            Ok(response) => Ok(TopicInfo::degraded(name, response.error_message())),
            Err(e) => Ok(TopicInfo::degraded(name, e.to_string())),
        }
    }

    /// List user-visible queue names
    pub async fn list_queues(&self) -> GatewayResult<Vec<String>> {
        self.list_destinations(DestinationType::Queue).await
    }

    /// List user-visible topic names (advisory topics excluded)
    pub async fn list_topics(&self) -> GatewayResult<Vec<String>> {
        self.list_destinations(DestinationType::Topic).await
    }

    async fn list_destinations(
        &self,
        destination_type: DestinationType,
    ) -> GatewayResult<Vec<String>> {
        self.ensure_connected()?;
        let broker_name = self.broker_name().await?;
        let pattern = jolokia::destination_wildcard(&broker_name, destination_type);
        let response = self.jolokia_ok(&JolokiaRequest::search(pattern)).await?;

        let mut names: Vec<String> = response
            .value
            .as_ref()
            .and_then(Value::as_array)
            .map(|mbeans| {
                mbeans
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|mbean| jolokia::extract_key_component(mbean, "destinationName"))
                    .filter(|name| !jolokia::is_advisory(name))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        Ok(names)
    }

    /// Read the broker's aggregate counters and resource usage
    pub async fn get_broker_info(&self) -> GatewayResult<BrokerInfo> {
        self.ensure_connected()?;
        let broker_name = self.broker_name().await?;
        let request = JolokiaRequest::read(jolokia::broker_mbean(&broker_name));
        let response = self.jolokia_ok(&request).await?;
        let value = response.value.unwrap_or(Value::Null);

        Ok(BrokerInfo {
            broker_name,
            connections: u64_attr(&value, "TotalConnectionsCount"),
            consumers: u64_attr(&value, "TotalConsumerCount"),
            producers: u64_attr(&value, "TotalProducerCount"),
            enqueue_count: u64_attr(&value, "TotalEnqueueCount"),
            dequeue_count: u64_attr(&value, "TotalDequeueCount"),
            message_count: u64_attr(&value, "TotalMessageCount"),
            memory: UsagePair::new(u64_attr(&value, "MemoryUsage"), u64_attr(&value, "MemoryLimit")),
            store: UsagePair::new(u64_attr(&value, "StoreUsage"), u64_attr(&value, "StoreLimit")),
            temp: UsagePair::new(u64_attr(&value, "TempUsage"), u64_attr(&value, "TempLimit")),
        })
    }

    /// Percentage-based health classification of the broker's resources
    pub async fn get_health(&self) -> GatewayResult<BrokerHealth> {
        Ok(self.get_broker_info().await?.health())
    }

    /// Broker counters plus queue/topic totals from the full listing
    pub async fn get_stats(&self) -> GatewayResult<BrokerStats> {
        let info = self.get_broker_info().await?;
        let queue_count = self.list_queues().await?.len();
        let topic_count = self.list_topics().await?.len();
        Ok(BrokerStats {
            info,
            queue_count,
            topic_count,
        })
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::invalid_argument(format!("invalid endpoint path: {e}")))
    }

    fn message_endpoint(&self, name: &str) -> GatewayResult<Url> {
        self.endpoint(&format!("api/message/{name}"))
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(username) => builder.basic_auth(username, self.config.password.as_deref()),
            None => builder,
        }
    }
}

fn u64_attr(value: &Value, attribute: &str) -> u64 {
    value.get(attribute).and_then(Value::as_u64).unwrap_or(0)
}
