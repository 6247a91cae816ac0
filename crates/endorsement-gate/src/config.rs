//! Gate and decision-service configuration.
//!
//! Both configs are plain values handed to constructors. Nothing in the gate
//! reads the process environment on its own; `from_env` exists for binaries.

use reqwest::Url;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default cap on outcome size (4 MiB).
pub const DEFAULT_MAX_OUTCOME_BYTES: usize = 4 * 1024 * 1024;

/// Default TCP connect timeout for the decision service.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration errors, raised at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No decision service endpoint was configured.
    #[error("Decision service endpoint is not configured")]
    MissingEndpoint,

    /// The endpoint is not an absolute http(s) URL.
    #[error("Invalid decision service endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The configured value
        endpoint: String,
        /// Why it was refused
        reason: String,
    },

    /// A numeric setting could not be parsed or is out of range.
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue {
        /// Setting name
        name: &'static str,
        /// The configured value
        value: String,
    },

    /// The HTTP client could not be built.
    #[error("Could not build HTTP client: {0}")]
    HttpClient(String),
}

// =============================================================================
// Decision Service
// =============================================================================

/// Where and how to reach the decision service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionServiceConfig {
    /// Absolute URL the effect set is POSTed to.
    pub endpoint: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves the request unbounded here.
    pub request_timeout: Option<Duration>,
}

impl DecisionServiceConfig {
    /// Config for `endpoint` with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }

    /// Set the whole-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Read configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `DECISION_SERVICE_URL`, or legacy `FLASK_SERVER`: endpoint (required)
    /// - `DECISION_CONNECT_TIMEOUT_MS`: connect timeout (default: 5000)
    /// - `DECISION_TIMEOUT_MS`: request timeout (default: unbounded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup("DECISION_SERVICE_URL")
            .or_else(|| lookup("FLASK_SERVER"))
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let mut config = Self::new(endpoint.trim());
        if let Some(ms) = parse_millis(&lookup, "DECISION_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = ms;
        }
        config.request_timeout = parse_millis(&lookup, "DECISION_TIMEOUT_MS")?;

        config.validated_endpoint()?;
        Ok(config)
    }

    /// Parse and check the endpoint.
    ///
    /// # Errors
    /// * `MissingEndpoint` - the endpoint is empty
    /// * `InvalidEndpoint` - not a URL, not http(s), or has no host
    pub fn validated_endpoint(&self) -> Result<Url, ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };

        let url = Url::parse(self.endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme {other}"))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".into()));
        }
        Ok(url)
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Limits applied by the gate itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Deadline for the whole evaluation call. `None` defers to the
    /// decision service's own timeouts.
    pub evaluation_timeout: Option<Duration>,
    /// Outcomes larger than this are refused before decoding.
    pub max_outcome_bytes: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            evaluation_timeout: None,
            max_outcome_bytes: DEFAULT_MAX_OUTCOME_BYTES,
        }
    }
}

impl GateConfig {
    /// Read configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `ENDORSER_EVALUATION_TIMEOUT_MS`: evaluation deadline (default: none)
    /// - `ENDORSER_MAX_OUTCOME_BYTES`: outcome size cap (default: 4 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self {
            evaluation_timeout: parse_millis(&lookup, "ENDORSER_EVALUATION_TIMEOUT_MS")?,
            ..Self::default()
        };
        if let Some(value) = lookup("ENDORSER_MAX_OUTCOME_BYTES") {
            config.max_outcome_bytes = value.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    name: "ENDORSER_MAX_OUTCOME_BYTES",
                    value: value.clone(),
                }
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would refuse every proposal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_outcome_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_outcome_bytes",
                value: "0".into(),
            });
        }
        if self.evaluation_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                name: "evaluation_timeout",
                value: "0".into(),
            });
        }
        Ok(())
    }
}
