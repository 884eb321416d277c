//! Rate limiter configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How the client identifier is derived from a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientIpPolicy {
    /// Use the TCP peer address and ignore `X-Forwarded-For`
    #[default]
    PeerAddr,
    /// Use only the last `X-Forwarded-For` entry, the one appended by the
    /// trusted proxy in front of the service
    RightmostForwarded,
    /// Use the whole `X-Forwarded-For` value whenever it is present.
    /// Clients can forge this header.
    TrustForwarded,
}

impl FromStr for ClientIpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "peer" => Ok(Self::PeerAddr),
            "proxy" | "rightmost" => Ok(Self::RightmostForwarded),
            "all" | "trust" => Ok(Self::TrustForwarded),
            other => Err(format!(
                "unknown forwarded-for policy '{}', expected none|proxy|all",
                other
            )),
        }
    }
}

impl fmt::Display for ClientIpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PeerAddr => "none",
            Self::RightmostForwarded => "proxy",
            Self::TrustForwarded => "all",
        };
        f.write_str(name)
    }
}

/// Per-client token bucket settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Steady-state tokens per second
    pub rps: f64,
    /// Bucket capacity
    pub burst: u32,
    /// Clients idle longer than this are forgotten
    pub idle_ttl: Duration,
    /// Period of the background eviction scan
    pub sweep_interval: Duration,
    /// Client identification policy
    pub client_ip: ClientIpPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rps: 5.0,
            burst: 10,
            idle_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
            client_ip: ClientIpPolicy::default(),
        }
    }
}

impl RateLimitConfig {
    /// Config with the given rate and burst, defaults elsewhere
    pub fn new(rps: f64, burst: u32) -> Self {
        Self {
            rps,
            burst,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.rps.is_finite() || self.rps <= 0.0 {
            return Err("rps must be a positive number".to_string());
        }

        if self.burst == 0 {
            return Err("burst must be greater than 0".to_string());
        }

        if self.idle_ttl.is_zero() {
            return Err("idle_ttl must be greater than 0".to_string());
        }

        if self.sweep_interval.is_zero() {
            return Err("sweep_interval must be greater than 0".to_string());
        }

        Ok(())
    }
}
