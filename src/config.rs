//! Tolerances applied by the timing checks.
//!
//! The defaults are the canonical contract. Hosts that load overrides from their own
//! configuration can deserialize a partial [`ValidationConfig`]; missing fields keep
//! their defaults.
//!
//! ```rust
//! use runcheck::ValidationConfig;
//!
//! let config: ValidationConfig = serde_json::from_str(r#"{ "splitMaxLagMs": 6000 }"#)?;
//! assert_eq!(config.split_max_lag_ms, 6000);
//! assert_eq!(config.submit_grace_ms, 10_000);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};

/// Timing tolerances, all in milliseconds except the tick epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Fixed allowance between the replay being written and the upload arriving
    pub submit_grace_ms: u64,
    /// Cap on the extra allowance of one second per minute of run time
    pub submit_grace_per_minute_cap_ms: u64,
    /// How far the replay may appear to be written ahead of the server clock
    pub future_grace_ms: u64,
    /// How far a session timestamp may arrive before its split
    pub split_early_margin_ms: u64,
    /// How far a session timestamp may lag behind its split
    pub split_max_lag_ms: u64,
    /// Maximum difference between the replay's tick interval and the gamemode's
    pub tick_interval_epsilon: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            submit_grace_ms: 10_000,
            submit_grace_per_minute_cap_ms: 20_000,
            future_grace_ms: 1_000,
            split_early_margin_ms: 1_000,
            split_max_lag_ms: 5_000,
            tick_interval_epsilon: 1e-6,
        }
    }
}

impl ValidationConfig {
    /// Longest acceptable delay between writing a replay and submitting it.
    ///
    /// The fixed grace plus one second for every minute of run time, with the
    /// per-minute part capped.
    pub fn acceptable_submit_delay_ms(&self, run_time_ms: f64) -> f64 {
        self.submit_grace_ms as f64
            + (run_time_ms / 60.0).min(self.submit_grace_per_minute_cap_ms as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptable_delay_scales_with_run_time() {
        let config = ValidationConfig::default();
        assert_eq!(config.acceptable_submit_delay_ms(0.0), 10_000.0);
        assert!((config.acceptable_submit_delay_ms(40_000.0) - 10_666.666_666).abs() < 1e-3);
        assert_eq!(config.acceptable_submit_delay_ms(60.0 * 60_000.0), 30_000.0);
        assert_eq!(config.acceptable_submit_delay_ms(f64::from(u32::MAX)), 30_000.0);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ValidationConfig = serde_json::from_str(r#"{ "futureGraceMs": 250 }"#).unwrap();
        assert_eq!(config.future_grace_ms, 250);
        assert_eq!(config.split_max_lag_ms, 5_000);
        assert_eq!(config.tick_interval_epsilon, 1e-6);
    }
}
