//! Tracker configuration: the concurrency cap, staleness window, and
//! polling cadence, loadable from JSON or the environment.

use serde::{Deserialize, Serialize};

const fn default_max_concurrent_calls() -> u32 {
    10
}

const fn default_call_timeout_hours() -> u64 {
    1
}

const fn default_poll_interval_ms() -> u64 {
    10_000
}

const fn default_wait_timeout_ms() -> u64 {
    300_000
}

/// Tracker configuration.
///
/// Defaults mirror the provider's documented limits: at most 10 concurrent
/// calls, calls presumed abandoned after an hour, slot polling every 10
/// seconds with a 5-minute default wait budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Hard cap mirroring the provider's documented concurrent-call limit.
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: u32,
    /// Staleness window in hours, bounding both active counting and
    /// reclamation. Functions as a soft lease on a slot.
    #[serde(default = "default_call_timeout_hours")]
    pub call_timeout_hours: u64,
    /// Polling cadence for `wait_for_slot`, milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Default timeout for `wait_for_slot`, milliseconds.
    #[serde(default = "default_wait_timeout_ms")]
    pub default_wait_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            call_timeout_hours: default_call_timeout_hours(),
            poll_interval_ms: default_poll_interval_ms(),
            default_wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

impl TrackerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_calls == 0 {
            return Err("max_concurrent_calls must be greater than 0".into());
        }
        if self.call_timeout_hours == 0 {
            return Err("call_timeout_hours must be greater than 0".into());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.default_wait_timeout_ms == 0 {
            return Err("default_wait_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse tracker configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, falling back to defaults
    /// for unset variables. Reads a `.env` file first if one is present.
    ///
    /// Recognized variables: `MAX_CONCURRENT_CALLS`, `CALL_TIMEOUT_HOURS`,
    /// `POLL_INTERVAL_MS`, `DEFAULT_WAIT_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let mut cfg = Self::default();
        if let Some(v) = read_env("MAX_CONCURRENT_CALLS")? {
            cfg.max_concurrent_calls = v;
        }
        if let Some(v) = read_env("CALL_TIMEOUT_HOURS")? {
            cfg.call_timeout_hours = v;
        }
        if let Some(v) = read_env("POLL_INTERVAL_MS")? {
            cfg.poll_interval_ms = v;
        }
        if let Some(v) = read_env("DEFAULT_WAIT_TIMEOUT_MS")? {
            cfg.default_wait_timeout_ms = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// The staleness window in milliseconds.
    pub fn staleness_window_ms(&self) -> u128 {
        u128::from(self.call_timeout_hours) * 3_600_000
    }

    /// The staleness window in seconds; the duration assigned to reclaimed
    /// records.
    pub fn staleness_window_secs(&self) -> u64 {
        self.call_timeout_hours * 3600
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| format!("{key} invalid: {e}")),
        Err(_) => Ok(None),
    }
}
