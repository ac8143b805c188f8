//! Bus configuration from defaults or environment variables.

use crate::error::BusError;
use crate::DEFAULT_MAX_DEPTH;
use std::env;

/// Configuration for one bus instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Name used in log fields to tell buses apart.
    pub name: String,

    /// Maximum nesting of synthesized `ReturnedMessage`/`FailedMessage`
    /// posts below a top-level `post`.
    pub max_depth: usize,

    /// Emit a `trace` event for every successful delivery.
    pub log_deliveries: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: "magic-bus".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            log_deliveries: false,
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MB_BUS_NAME`: Bus name (default: magic-bus)
    /// - `MB_MAX_DEPTH`: Synthesized message nesting limit (default: 8)
    /// - `MB_LOG_DELIVERIES`: Trace every delivery (default: false)
    ///
    /// # Errors
    ///
    /// `BusError::InvalidEnvVar` if `MB_MAX_DEPTH` is not an unsigned
    /// integer, `BusError::InvalidConfig` if the result fails validation.
    pub fn from_env() -> Result<Self, BusError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// As for [`BusConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BusError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_depth: usize = match lookup("MB_MAX_DEPTH") {
            Some(raw) => raw.trim().parse().map_err(|_| BusError::InvalidEnvVar {
                name: "MB_MAX_DEPTH",
                value: raw.clone(),
            })?,
            None => defaults.max_depth,
        };

        let config = Self {
            name: lookup("MB_BUS_NAME").unwrap_or(defaults.name),
            max_depth,
            log_deliveries: lookup("MB_LOG_DELIVERIES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.log_deliveries),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the bus name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the synthesized message nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable per-delivery tracing.
    #[must_use]
    pub fn with_log_deliveries(mut self, enabled: bool) -> Self {
        self.log_deliveries = enabled;
        self
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidConfig` for an empty name or a zero `max_depth`
    /// (which would make dead letters unobservable).
    pub fn validate(&self) -> Result<(), BusError> {
        if self.name.trim().is_empty() {
            return Err(BusError::InvalidConfig("name must not be empty".to_string()));
        }
        if self.max_depth == 0 {
            return Err(BusError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
