//! Environment-only configuration loading and validation.
//!
//! Per §9's design note, configuration is loaded once into an immutable value and
//! passed through constructors — nothing in this crate reads `std::env` again after
//! [`Config::from_env`] returns.

use std::env;
use std::time::Duration;

use crate::state::StateCode;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
    #[error("{var}: out of range {value} (expected {min}..={max})")]
    OutOfRange { var: &'static str, value: i64, min: i64, max: i64 },
    #[error("{var} is required but was not set")]
    Missing { var: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub check_interval: Duration,

    pub max_retries_health_check: usize,
    pub max_retries_bgp_check: usize,
    pub max_retries_bgp_update: usize,
    pub max_retries_cloudflare: usize,

    pub initial_backoff: Duration,
    pub max_backoff: Duration,

    pub circuit_breaker_threshold: usize,
    pub circuit_breaker_timeout: Duration,

    pub health_check_window: usize,
    pub health_check_threshold: usize,
    pub asymmetric_hysteresis: bool,

    pub state_verification_thresholds: std::collections::HashMap<u8, usize>,

    pub min_state_dwell_time: Duration,
    pub dwell_time_exception_states: Vec<StateCode>,

    pub run_passive: bool,

    pub gcp_api_timeout: Duration,
    pub gcp_backend_health_timeout: Duration,
    pub gcp_bgp_operation_timeout: Duration,
    pub cloudflare_api_timeout: Duration,
    pub cloudflare_bulk_timeout: Duration,

    pub topology: Topology,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub local_gcp_region: String,
    pub remote_gcp_region: String,
    pub local_bgp_router: String,
    pub remote_bgp_router: String,
    pub local_bgp_region: String,
    pub remote_bgp_region: String,
    pub bgp_peer_project: String,
    pub gcp_project: String,
    pub primary_prefix: String,
    pub secondary_prefix: String,
    pub description_substring: String,
    pub cloudflare_primary_priority: String,
    pub cloudflare_secondary_priority: String,
    pub cloudflare_account_id: String,
    pub cloudflare_api_token: String,

    pub gcp_monitor_base_url: String,
    pub cloudflare_api_base_url: String,
}

fn env_string(var: &'static str, default: Option<&str>) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(v) => Ok(v),
        Err(_) => default.map(str::to_string).ok_or(ConfigError::Missing { var }),
    }
}

fn env_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::Invalid {
                var,
                value: other.to_string(),
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}

fn env_usize_range(
    var: &'static str,
    default: usize,
    min: usize,
    max: usize,
) -> Result<usize, ConfigError> {
    let raw = match env::var(var) {
        Err(_) => return Ok(default),
        Ok(v) => v,
    };
    let parsed: i64 = raw
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value: raw.clone(), reason: "expected an integer".to_string() })?;
    if parsed < min as i64 || parsed > max as i64 {
        return Err(ConfigError::OutOfRange { var, value: parsed, min: min as i64, max: max as i64 });
    }
    Ok(parsed as usize)
}

fn env_seconds_f64(var: &'static str, default: f64) -> Result<Duration, ConfigError> {
    let raw = match env::var(var) {
        Err(_) => return Ok(Duration::from_secs_f64(default)),
        Ok(v) => v,
    };
    let parsed: f64 = raw
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value: raw.clone(), reason: "expected a number".to_string() })?;
    if !(parsed.is_finite() && parsed >= 0.0) {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "expected a non-negative, finite number of seconds".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(parsed))
}

fn env_seconds_range(
    var: &'static str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<Duration, ConfigError> {
    let secs = env_usize_range(var, default as usize, min as usize, max as usize)?;
    Ok(Duration::from_secs(secs as u64))
}

fn parse_exception_states(raw: &str) -> Result<Vec<StateCode>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .ok()
                .filter(|&n| n <= 6)
                .map(StateCode::new)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "DWELL_TIME_EXCEPTION_STATES",
                    value: raw.to_string(),
                    reason: "expected a comma list of state codes 0-6".to_string(),
                })
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let check_interval = env_seconds_range("CHECK_INTERVAL_SECONDS", 60, 1, 3600)?;

        let legacy_max_retries = env_usize_range("MAX_RETRIES", 3, 0, 50)?;
        let health_check_default = if env::var("MAX_RETRIES_HEALTH_CHECK").is_err()
            && env::var("MAX_RETRIES").is_ok()
        {
            legacy_max_retries
        } else {
            5
        };
        let max_retries_health_check =
            env_usize_range("MAX_RETRIES_HEALTH_CHECK", health_check_default, 0, 50)?;
        let max_retries_bgp_check = env_usize_range("MAX_RETRIES_BGP_CHECK", 4, 0, 50)?;
        let max_retries_bgp_update = env_usize_range("MAX_RETRIES_BGP_UPDATE", 2, 0, 50)?;
        let max_retries_cloudflare = env_usize_range("MAX_RETRIES_CLOUDFLARE", 3, 0, 50)?;

        let initial_backoff = env_seconds_f64("INITIAL_BACKOFF_SECONDS", 1.0)?;
        let max_backoff = env_seconds_f64("MAX_BACKOFF_SECONDS", 60.0)?;

        let circuit_breaker_threshold = env_usize_range("CIRCUIT_BREAKER_THRESHOLD", 5, 1, 1000)?;
        let circuit_breaker_timeout =
            env_seconds_range("CIRCUIT_BREAKER_TIMEOUT_SECONDS", 300, 1, 86400)?;

        let health_check_window = env_usize_range("HEALTH_CHECK_WINDOW", 5, 3, 10)?;
        let health_check_threshold =
            env_usize_range("HEALTH_CHECK_THRESHOLD", 3, 1, health_check_window)?;
        let asymmetric_hysteresis = env_bool("ASYMMETRIC_HYSTERESIS", false)?;

        let mut state_verification_thresholds = std::collections::HashMap::new();
        for (var, state) in [
            ("STATE_2_VERIFICATION_THRESHOLD", 2u8),
            ("STATE_3_VERIFICATION_THRESHOLD", 3u8),
            ("STATE_4_VERIFICATION_THRESHOLD", 4u8),
        ] {
            state_verification_thresholds.insert(state, env_usize_range(var, 2, 1, 10)?);
        }

        let min_state_dwell_time = env_seconds_range("MIN_STATE_DWELL_TIME", 120, 30, 600)?;
        let dwell_time_exception_states = match env::var("DWELL_TIME_EXCEPTION_STATES") {
            Err(_) => vec![StateCode::new(1), StateCode::new(4)],
            Ok(raw) => parse_exception_states(&raw)?,
        };

        let run_passive = env_bool("RUN_PASSIVE", false)?;

        let gcp_api_timeout = env_seconds_range("GCP_API_TIMEOUT", 30, 5, 300)?;
        let gcp_backend_health_timeout = env_seconds_range("GCP_BACKEND_HEALTH_TIMEOUT", 45, 5, 300)?;
        let gcp_bgp_operation_timeout = env_seconds_range("GCP_BGP_OPERATION_TIMEOUT", 60, 5, 300)?;
        let cloudflare_api_timeout = env_seconds_range("CLOUDFLARE_API_TIMEOUT", 10, 5, 300)?;
        let cloudflare_bulk_timeout = env_seconds_range("CLOUDFLARE_BULK_TIMEOUT", 60, 5, 300)?;

        let topology = Topology {
            local_gcp_region: env_string("LOCAL_GCP_REGION", None)?,
            remote_gcp_region: env_string("REMOTE_GCP_REGION", None)?,
            local_bgp_router: env_string("LOCAL_BGP_ROUTER", None)?,
            remote_bgp_router: env_string("REMOTE_BGP_ROUTER", None)?,
            local_bgp_region: env_string("LOCAL_BGP_REGION", None)?,
            remote_bgp_region: env_string("REMOTE_BGP_REGION", None)?,
            bgp_peer_project: env_string("BGP_PEER_PROJECT", None)?,
            gcp_project: env_string("GCP_PROJECT", None)?,
            primary_prefix: env_string("PRIMARY_PREFIX", None)?,
            secondary_prefix: env_string("SECONDARY_PREFIX", None)?,
            description_substring: env_string("DESCRIPTION_SUBSTRING", None)?,
            cloudflare_primary_priority: env_string("CLOUDFLARE_PRIMARY_PRIORITY", None)?,
            cloudflare_secondary_priority: env_string("CLOUDFLARE_SECONDARY_PRIORITY", None)?,
            cloudflare_account_id: env_string("CLOUDFLARE_ACCOUNT_ID", None)?,
            cloudflare_api_token: env_string("CLOUDFLARE_API_TOKEN", None)?,
            gcp_monitor_base_url: env_string(
                "GCP_MONITOR_BASE_URL",
                Some("https://compute.googleapis.com/compute/v1"),
            )?,
            cloudflare_api_base_url: env_string(
                "CLOUDFLARE_API_BASE_URL",
                Some("https://api.cloudflare.com/client/v4"),
            )?,
        };

        Ok(Config {
            check_interval,
            max_retries_health_check,
            max_retries_bgp_check,
            max_retries_bgp_update,
            max_retries_cloudflare,
            initial_backoff,
            max_backoff,
            circuit_breaker_threshold,
            circuit_breaker_timeout,
            health_check_window,
            health_check_threshold,
            asymmetric_hysteresis,
            state_verification_thresholds,
            min_state_dwell_time,
            dwell_time_exception_states,
            run_passive,
            gcp_api_timeout,
            gcp_backend_health_timeout,
            gcp_bgp_operation_timeout,
            cloudflare_api_timeout,
            cloudflare_bulk_timeout,
            topology,
        })
    }
}
