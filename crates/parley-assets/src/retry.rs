//! Exponential backoff retry logic for asset transfers.
//!
//! Model downloads are the only network-dependent step in the system, so
//! they are the only place that retries automatically. Retries are applied
//! to transient transfer failures; cache inspection and extraction never
//! retry.

use std::time::Duration;

use crate::error::AssetError;

/// Configuration for transfer retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3).
    pub max_retries: u32,
    /// Base delay between retries (default: 1 second).
    pub base_delay: Duration,
    /// Maximum delay between retries (default: 30 seconds).
    pub max_delay: Duration,
    /// Jitter factor: random 0..jitter_fraction of the delay is added (default: 0.25).
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_fraction: 0.25,
        }
    }
}

/// Determines whether an [`AssetError`] should be retried.
///
/// Only transport-level failures are transient. Cache-state errors
/// (missing, empty) and extraction failures will not get better by
/// retrying the same transfer.
pub fn is_retryable(err: &AssetError) -> bool {
    match err {
        AssetError::Transfer(_) => true,
        AssetError::IncompleteTransfer { .. } => true,
        AssetError::Http(_) => true,
        AssetError::Missing(_)
        | AssetError::Empty(_)
        | AssetError::Archive(_)
        | AssetError::Io(_) => false,
    }
}

/// Calculate delay for attempt `n` (0-indexed) with exponential backoff + jitter.
///
/// The delay is `min(base_delay * 2^n, max_delay)` plus a random jitter of
/// `0..jitter_fraction * delay`.
pub fn compute_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    let base_ms = config.base_delay.as_millis() as u64;
    let raw_ms = base_ms.saturating_mul(exp);
    let capped_ms = raw_ms.min(config.max_delay.as_millis() as u64);

    let jitter_max_ms = (capped_ms as f64 * config.jitter_fraction) as u64;
    let jitter_ms = if jitter_max_ms > 0 {
        // Cheap pseudo-randomness from the system clock nanoseconds.
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as u64;
        seed % (jitter_max_ms + 1)
    } else {
        0
    };

    Duration::from_millis(capped_ms + jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_retry_config() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.base_delay, Duration::from_secs(1));
        assert_eq!(cfg.max_delay, Duration::from_secs(30));
        assert!((cfg.jitter_fraction - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn is_retryable_transfer() {
        assert!(is_retryable(&AssetError::Transfer("HTTP 503".into())));
    }

    #[test]
    fn is_retryable_incomplete() {
        assert!(is_retryable(&AssetError::IncompleteTransfer {
            expected: 10,
            actual: 3,
        }));
    }

    #[test]
    fn is_not_retryable_missing() {
        assert!(!is_retryable(&AssetError::Missing(PathBuf::from("/x"))));
    }

    #[test]
    fn is_not_retryable_empty() {
        assert!(!is_retryable(&AssetError::Empty(PathBuf::from("/x"))));
    }

    #[test]
    fn is_not_retryable_archive() {
        assert!(!is_retryable(&AssetError::Archive("bad zip".into())));
    }

    #[test]
    fn compute_delay_exponential() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            jitter_fraction: 0.0,
        };
        assert_eq!(compute_delay(&config, 0).as_millis(), 100);
        assert_eq!(compute_delay(&config, 1).as_millis(), 200);
        assert_eq!(compute_delay(&config, 2).as_millis(), 400);
    }

    #[test]
    fn compute_delay_capped() {
        let config = RetryConfig {
            max_retries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            jitter_fraction: 0.0,
        };
        assert_eq!(compute_delay(&config, 5).as_millis(), 5000);
    }

    #[test]
    fn compute_delay_with_jitter_bounded() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter_fraction: 0.25,
        };
        for _ in 0..20 {
            let ms = compute_delay(&config, 0).as_millis();
            assert!(ms >= 1000, "delay {ms} < 1000");
            assert!(ms <= 1250, "delay {ms} > 1250");
        }
    }
}
