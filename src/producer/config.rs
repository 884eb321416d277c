//! Producer configuration structures

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kafka producer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Kafka broker addresses (comma-separated)
    pub brokers: String,

    /// Topic articles are published to
    pub topic: String,

    /// Acknowledgements required per write ("1" = leader only)
    pub acks: String,

    /// librdkafka partitioner; keyed records always land on the same partition
    pub partitioner: String,

    /// How long a single publish may wait for delivery
    pub delivery_timeout: Duration,

    /// How long `close` waits for outstanding deliveries
    pub flush_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            brokers: "kafka:9092".to_string(),
            topic: "news-updates".to_string(),
            acks: "1".to_string(),
            partitioner: "murmur2_random".to_string(),
            delivery_timeout: Duration::from_secs(30),
            flush_timeout: Duration::from_secs(10),
        }
    }
}

impl ProducerConfig {
    /// Config for the given broker list and topic, defaults elsewhere
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.brokers.is_empty() {
            return Err("Brokers cannot be empty".to_string());
        }

        if self.topic.is_empty() {
            return Err("Topic cannot be empty".to_string());
        }

        if !matches!(self.acks.as_str(), "0" | "1" | "-1" | "all") {
            return Err(format!("Unsupported acks value '{}'", self.acks));
        }

        if self.delivery_timeout.is_zero() {
            return Err("Delivery timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProducerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.acks, "1");
    }

    #[test]
    fn test_validation_failures() {
        assert!(ProducerConfig::new("", "t").validate().is_err());
        assert!(ProducerConfig::new("b:9092", "").validate().is_err());

        let mut config = ProducerConfig::new("b:9092", "t");
        config.acks = "2".to_string();
        assert!(config.validate().is_err());

        let mut config = ProducerConfig::new("b:9092", "t");
        config.delivery_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
