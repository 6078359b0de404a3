use std::time::Duration;

use crate::RetryPolicy;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds. `None` keeps the transport default.
    pub timeout_ms: Option<u64>,
    /// Retry policy used when a request does not carry its own.
    pub retry: RetryPolicy,
}

impl ClientOptions {
    /// Reads options from the environment, falling back to defaults.
    ///
    /// Reads (all optional):
    /// - `HAIRSCAN_TIMEOUT_MS`
    /// - `HAIRSCAN_MAX_ATTEMPTS`
    /// - `HAIRSCAN_INITIAL_DELAY_MS`
    /// - `HAIRSCAN_BACKOFF_MULTIPLIER`
    ///
    /// Returns an error naming the variable if a value does not parse.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(ms) = parse_var::<u64, _>(&lookup, "HAIRSCAN_TIMEOUT_MS")? {
            opts.timeout_ms = Some(ms);
        }
        if let Some(attempts) = parse_var(&lookup, "HAIRSCAN_MAX_ATTEMPTS")? {
            opts.retry.max_attempts = attempts;
        }
        if let Some(ms) = parse_var(&lookup, "HAIRSCAN_INITIAL_DELAY_MS")? {
            opts.retry.initial_delay = Duration::from_millis(ms);
        }
        if let Some(multiplier) = parse_var(&lookup, "HAIRSCAN_BACKOFF_MULTIPLIER")? {
            opts.retry.multiplier = multiplier;
        }

        opts.retry.validate().map_err(|err| err.to_string())?;
        Ok(opts)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| format!("{key} has invalid value '{raw}': {err}")),
    }
}
