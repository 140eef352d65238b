// Session configuration.

use std::time::Duration;

use pitlight_api::{DEFAULT_API_URL, RetryPolicy, TransportConfig};

/// Bounds and backoff for the monitor's reconnect procedure.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(5000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl ReconnectConfig {
    /// Backoff after the n-th failed attempt (1-based):
    /// `min(base * 2^(n-1), max)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1));
        exp.min(self.max_delay)
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the lighting API.
    pub api_url: String,
    pub transport: TransportConfig,
    /// Retry policy applied to every individual API command.
    pub retry: RetryPolicy,
    /// Liveness probe interval. Zero disables the connection monitor
    /// (used by one-shot CLI invocations).
    pub monitor_interval: Duration,
    pub reconnect: ReconnectConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
            monitor_interval: Duration::from_secs(60),
            reconnect: ReconnectConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_backoff_doubles_and_caps() {
        let cfg = ReconnectConfig::default();
        assert_eq!(cfg.delay(1), Duration::from_millis(5000));
        assert_eq!(cfg.delay(2), Duration::from_millis(10_000));
        assert_eq!(cfg.delay(3), Duration::from_millis(20_000));
        assert_eq!(cfg.delay(4), Duration::from_millis(30_000));
        assert_eq!(cfg.delay(5), Duration::from_millis(30_000));
    }
}
