//! Exponential-backoff reconnection for the notification channel.
//!
//! Events published while the worker is disconnected are not replayed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::client::{ChannelClient, ChannelStream};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay, clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Keep trying to connect until it succeeds or `cancel` fires.
///
/// Returns `None` if cancelled first.
pub async fn reconnect_loop(
    client: &ChannelClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<ChannelStream> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        // Wait before each attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::info!(
            url = client.url(),
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting to notification channel",
        );

        tokio::select! {
            _ = cancel.cancelled() => return None,
            result = client.connect() => match result {
                Ok(stream) => return Some(stream),
                Err(e) => tracing::warn!(error = %e, "Reconnect attempt {attempt} failed"),
            }
        }

        delay = next_delay(delay, config);
    }
}
