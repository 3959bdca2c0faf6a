//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the pipeline can start with zero
//! configuration for local development.

use std::time::Duration;

use sentinel_shared::constants::{
    AUTO_REPLY_DELAY, CHANNEL_ROSTER, DEFAULT_CHANNEL, DEFAULT_SERVER_URL, POLL_INTERVAL,
    SCAN_DELAY,
};
use sentinel_shared::types::{Channel, ChannelHandle};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Sentinel API.
    /// Env: `SENTINEL_SERVER_URL`
    /// Default: `http://127.0.0.1:8000/api/v1`
    pub server_url: String,

    /// Interval between full-state polls of the active channel.
    /// Env: `SENTINEL_POLL_INTERVAL_MS`
    /// Default: 3000
    pub poll_interval: Duration,

    /// Simulated latency before the classification round trip.
    /// Env: `SENTINEL_SCAN_DELAY_MS`
    /// Default: 1500
    pub scan_delay: Duration,

    /// Whether to synthesize a canned counterpart reply after a message
    /// resolves to sent.  Demo affordance, not protocol behaviour.
    /// Env: `SENTINEL_AUTO_REPLY` (true/false)
    /// Default: `false`
    pub auto_reply: bool,

    /// Delay before the synthesized reply appears.
    pub auto_reply_delay: Duration,

    /// Standing group channels, known at startup.
    pub channels: Vec<Channel>,

    /// Channel selected when the pipeline starts.
    pub initial_channel: ChannelHandle,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            scan_delay: SCAN_DELAY,
            auto_reply: false,
            auto_reply_delay: AUTO_REPLY_DELAY,
            channels: CHANNEL_ROSTER
                .iter()
                .map(|(handle, name, status)| Channel {
                    handle: ChannelHandle::new(*handle),
                    name: (*name).to_string(),
                    status: (*status).to_string(),
                })
                .collect(),
            initial_channel: ChannelHandle::new(DEFAULT_CHANNEL),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SENTINEL_SERVER_URL") {
            config.server_url = url;
        }

        if let Ok(val) = std::env::var("SENTINEL_POLL_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => {
                    tracing::warn!(value = %val, "Invalid SENTINEL_POLL_INTERVAL_MS, using default");
                }
            }
        }

        if let Ok(val) = std::env::var("SENTINEL_SCAN_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.scan_delay = Duration::from_millis(ms),
                _ => {
                    tracing::warn!(value = %val, "Invalid SENTINEL_SCAN_DELAY_MS, using default");
                }
            }
        }

        if let Ok(val) = std::env::var("SENTINEL_AUTO_REPLY") {
            config.auto_reply = val == "true" || val == "1";
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.initial_channel, ChannelHandle::new("general"));
        assert_eq!(config.channels.len(), 4);
        assert!(!config.auto_reply);
    }

    #[test]
    fn test_roster_contains_standing_channels() {
        let config = ClientConfig::default();
        let names: Vec<&str> = config.channels.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Alpha Team"));
        assert!(names.contains(&"HQ Command"));
    }
}
