//! Consumer configuration structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Kafka properties callers may override through `kafka_properties`
pub const ALLOWED_KAFKA_PROPS: &[&str] = &[
    // Fetch settings
    "fetch.min.bytes",
    "fetch.wait.max.ms",
    "fetch.max.bytes",
    "max.partition.fetch.bytes",
    "fetch.error.backoff.ms",
    // Request settings
    "request.timeout.ms",
    "metadata.max.age.ms",
    "socket.timeout.ms",
    // Consumer settings
    "queued.min.messages",
    "queued.max.messages.kbytes",
    "heartbeat.interval.ms",
    // Connection settings
    "reconnect.backoff.ms",
    "reconnect.backoff.max.ms",
    "connections.max.idle.ms",
    "socket.keepalive.enable",
    // Monitoring
    "statistics.interval.ms",
];

/// Kafka consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Kafka broker addresses (comma-separated)
    pub brokers: String,

    /// Consumer group ID
    pub group_id: String,

    /// Topic to consume from
    pub topic: String,

    /// Session timeout in milliseconds
    pub session_timeout_ms: u32,

    /// Offset reset policy (earliest, latest)
    pub auto_offset_reset: String,

    /// Minimum bytes the broker accumulates before answering a fetch
    pub fetch_min_bytes: u32,

    /// Maximum bytes returned by one fetch
    pub fetch_max_bytes: u32,

    /// Maximum time the broker waits to satisfy `fetch_min_bytes`
    pub fetch_max_wait: Duration,

    /// Pause after a failed fetch before trying again
    pub fetch_error_backoff: Duration,

    /// Additional Kafka properties
    pub kafka_properties: HashMap<String, String>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "kafka:9092".to_string(),
            group_id: "news-aggregator-group".to_string(),
            topic: "news-updates".to_string(),
            session_timeout_ms: 30000,
            auto_offset_reset: "earliest".to_string(),
            fetch_min_bytes: 10_000,
            fetch_max_bytes: 10_000_000,
            fetch_max_wait: Duration::from_secs(1),
            fetch_error_backoff: Duration::from_secs(1),
            kafka_properties: HashMap::new(),
        }
    }
}

/// Builder for ConsumerConfig
#[derive(Debug)]
pub struct ConsumerConfigBuilder {
    config: ConsumerConfig,
}

impl ConsumerConfigBuilder {
    /// Create a new consumer config builder
    pub fn new() -> Self {
        Self {
            config: ConsumerConfig::default(),
        }
    }

    /// Set the broker addresses
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.config.brokers = brokers.into();
        self
    }

    /// Set the consumer group ID
    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.config.group_id = group_id.into();
        self
    }

    /// Set the topic to consume
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.config.topic = topic.into();
        self
    }

    /// Set the offset reset policy
    pub fn auto_offset_reset(mut self, policy: impl Into<String>) -> Self {
        self.config.auto_offset_reset = policy.into();
        self
    }

    /// Set the pause after a failed fetch
    pub fn fetch_error_backoff(mut self, backoff: Duration) -> Self {
        self.config.fetch_error_backoff = backoff;
        self
    }

    /// Add a custom Kafka property
    pub fn kafka_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.kafka_properties.insert(key.into(), value.into());
        self
    }

    /// Build the consumer configuration
    pub fn build(self) -> ConsumerConfig {
        self.config
    }
}

impl Default for ConsumerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsumerConfig {
    /// Create a new consumer config builder
    pub fn builder() -> ConsumerConfigBuilder {
        ConsumerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.brokers.is_empty() {
            return Err("Brokers cannot be empty".to_string());
        }

        if self.group_id.is_empty() {
            return Err("Group ID cannot be empty".to_string());
        }

        if self.topic.is_empty() {
            return Err("Topic cannot be empty".to_string());
        }

        if !matches!(self.auto_offset_reset.as_str(), "earliest" | "latest") {
            return Err(format!(
                "Unsupported offset reset policy '{}'",
                self.auto_offset_reset
            ));
        }

        if self.fetch_min_bytes > self.fetch_max_bytes {
            return Err("fetch_min_bytes cannot exceed fetch_max_bytes".to_string());
        }

        if self.fetch_max_wait.is_zero() {
            return Err("Fetch max wait must be greater than 0".to_string());
        }

        for key in self.kafka_properties.keys() {
            if !ALLOWED_KAFKA_PROPS.contains(&key.as_str()) {
                return Err(format!(
                    "Disallowed Kafka property '{}'. Allowed properties: {:?}",
                    key, ALLOWED_KAFKA_PROPS
                ));
            }
        }

        Ok(())
    }
}
