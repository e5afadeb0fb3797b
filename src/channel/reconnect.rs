use std::time::Duration;

/// Exponential backoff applied between push channel connection attempts.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt, and again after any successful connection.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    pub multiplier: f64
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0
        }
    }
}

/// Lower bound of every delay after the first, so a zero start still backs off.
const MIN_DELAY: Duration = Duration::from_millis(100);

/// The delay that follows `current`, never below 100ms and clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).max(MIN_DELAY).min(config.max_delay.max(MIN_DELAY))
}
