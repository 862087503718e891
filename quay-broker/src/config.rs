//! Broker configuration.

use crate::error::{BrokerError, BrokerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest poll wait the broker accepts.
const MAX_POLL_WAIT: Duration = Duration::from_secs(20);

/// Configuration for the in-memory broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// How long a consumer sleeps when its topic queue is empty.
    pub poll_wait: Duration,

    /// Upper bound on one handler invocation.
    pub consume_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            poll_wait: Duration::from_secs(2),
            consume_timeout: Duration::from_secs(180),
        }
    }
}

impl BrokerConfig {
    /// Checks the configured durations against each other.
    ///
    /// `poll_wait` must stay within `0..=20s`, and the consume timeout must
    /// exceed it or an idle consumer could never finish a delivery in time.
    pub fn validate(&self) -> BrokerResult<()> {
        if self.poll_wait > MAX_POLL_WAIT {
            return Err(BrokerError::InvalidConfig(format!(
                "poll_wait must be within 0..{}s",
                MAX_POLL_WAIT.as_secs()
            )));
        }

        if self.consume_timeout <= self.poll_wait {
            return Err(BrokerError::InvalidConfig(
                "consume_timeout must be greater than poll_wait".to_string(),
            ));
        }

        Ok(())
    }
}
