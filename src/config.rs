//! Runtime knobs observed by the front-end.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries to put in the response of a get-entries
    /// request.
    pub max_leaf_entries_per_response: u64,
    /// Time between node staleness checks.
    pub staleness_check_delay: Duration,
    /// Accept certificates/pre-certificates as input.
    pub accept_certificates: bool,
    /// Accept arbitrary signed data as input.
    pub accept_signed_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_leaf_entries_per_response: 1000,
            staleness_check_delay: Duration::from_secs(5),
            accept_certificates: true,
            accept_signed_data: false,
        }
    }
}

impl Config {
    /// Builds a configuration from `CTFE_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_leaf_entries_per_response: env_parse(
                "CTFE_MAX_LEAF_ENTRIES_PER_RESPONSE",
                defaults.max_leaf_entries_per_response,
            ),
            staleness_check_delay: Duration::from_secs(env_parse(
                "CTFE_STALENESS_CHECK_DELAY_SECS",
                defaults.staleness_check_delay.as_secs(),
            )),
            accept_certificates: env_parse("CTFE_ACCEPT_CERTIFICATES", defaults.accept_certificates),
            accept_signed_data: env_parse("CTFE_ACCEPT_SIGNED_DATA", defaults.accept_signed_data),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
