use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("PIPELINE_MIN_DURATION_SECS ({min:?}) is larger than PIPELINE_MAX_DURATION_SECS ({max:?})")]
    DurationRange { min: Duration, max: Duration },
}

/// Timing and outcome settings for the simulated pipeline executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutorConfig {
    /// Lower bound of the simulated run time
    pub min_duration: Duration,
    /// Upper bound of the simulated run time
    pub max_duration: Duration,
    /// Probability in `[0, 1]` that a run completes successfully
    pub success_rate: f64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_secs(10),
            max_duration: Duration::from_secs(30),
            success_rate: 0.8,
        }
    }
}

impl ExecutorConfig {
    pub fn new(min_duration: Duration, max_duration: Duration, success_rate: f64) -> Self {
        Self {
            min_duration,
            max_duration,
            success_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Body of `GET /`
    pub echo_message: String,
    /// Reported by `GET /version`; set by the deployment from the image tag
    pub image_tag: String,
    /// Allowed CORS origin. Any origin is allowed when unset.
    pub client_url: Option<String>,
    pub executor: ExecutorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            echo_message: "Hello World".to_string(),
            image_tag: "unknown".to_string(),
            client_url: None,
            executor: ExecutorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    name: "BIND_ADDR",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.bind_addr,
        };

        let min_duration = match lookup("PIPELINE_MIN_DURATION_SECS") {
            Some(raw) => parse_seconds("PIPELINE_MIN_DURATION_SECS", &raw)?,
            None => defaults.executor.min_duration,
        };
        let max_duration = match lookup("PIPELINE_MAX_DURATION_SECS") {
            Some(raw) => parse_seconds("PIPELINE_MAX_DURATION_SECS", &raw)?,
            None => defaults.executor.max_duration,
        };
        if min_duration > max_duration {
            return Err(ConfigError::DurationRange {
                min: min_duration,
                max: max_duration,
            });
        }

        let success_rate = match lookup("PIPELINE_SUCCESS_RATE") {
            Some(raw) => parse_rate(&raw)?,
            None => defaults.executor.success_rate,
        };

        Ok(Self {
            bind_addr,
            echo_message: lookup("ECHO_MESSAGE").unwrap_or(defaults.echo_message),
            image_tag: lookup("IMAGE_TAG").unwrap_or(defaults.image_tag),
            client_url: lookup("CLIENT_URL").filter(|url| !url.is_empty()),
            executor: ExecutorConfig::new(min_duration, max_duration, success_rate),
        })
    }
}

fn parse_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        reason,
    };
    let secs: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    Duration::try_from_secs_f64(secs).map_err(|e| invalid(e.to_string()))
}

fn parse_rate(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        name: "PIPELINE_SUCCESS_RATE",
        value: raw.to_string(),
        reason,
    };
    let rate: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(invalid("must be between 0 and 1".to_string()));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn executor_config_default() {
        let cfg = ExecutorConfig::default();
        assert_eq!(cfg.min_duration, Duration::from_secs(10));
        assert_eq!(cfg.max_duration, Duration::from_secs(30));
        assert_eq!(cfg.success_rate, 0.8);
    }

    #[test]
    fn app_config_defaults_when_nothing_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(cfg.echo_message, "Hello World");
        assert_eq!(cfg.image_tag, "unknown");
        assert!(cfg.client_url.is_none());
        assert_eq!(cfg.executor, ExecutorConfig::default());
    }

    #[test]
    fn app_config_reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("ECHO_MESSAGE", "Mind the gap"),
            ("IMAGE_TAG", "v1.2.3"),
            ("CLIENT_URL", "http://localhost:5173"),
            ("PIPELINE_MIN_DURATION_SECS", "0.1"),
            ("PIPELINE_MAX_DURATION_SECS", "0.5"),
            ("PIPELINE_SUCCESS_RATE", "1.0"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.echo_message, "Mind the gap");
        assert_eq!(cfg.image_tag, "v1.2.3");
        assert_eq!(cfg.client_url.as_deref(), Some("http://localhost:5173"));
        assert_eq!(cfg.executor.min_duration, Duration::from_millis(100));
        assert_eq!(cfg.executor.max_duration, Duration::from_millis(500));
        assert_eq!(cfg.executor.success_rate, 1.0);
    }

    #[test]
    fn app_config_rejects_bad_success_rate() {
        let err = AppConfig::from_lookup(lookup_from(&[("PIPELINE_SUCCESS_RATE", "1.5")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "PIPELINE_SUCCESS_RATE", .. }
        ));
    }

    #[test]
    fn app_config_rejects_negative_duration() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("PIPELINE_MIN_DURATION_SECS", "-1")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "PIPELINE_MIN_DURATION_SECS", .. }
        ));
    }

    #[test]
    fn app_config_rejects_inverted_duration_range() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("PIPELINE_MIN_DURATION_SECS", "5"),
            ("PIPELINE_MAX_DURATION_SECS", "1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::DurationRange { .. }));
    }

    #[test]
    fn app_config_rejects_bad_bind_addr() {
        let err = AppConfig::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "BIND_ADDR", .. }));
    }
}
