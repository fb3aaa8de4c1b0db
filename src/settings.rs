/// Configuration for fault barriers
///
/// Settings are layered: built-in defaults, then an optional configuration
/// file (format picked from its extension), then environment variables with
/// the `FAULT_BARRIER_` prefix. Nested keys are separated by `__`, e.g.
/// `FAULT_BARRIER_OBSERVER__SEVERITY=warn`.
use crate::{BarrierError, BarrierResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FAULT_BARRIER";

/// Severity at which observer notifications are emitted
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Lowercase name, as accepted by [`FromStr`] and `RUST_LOG`
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = BarrierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(BarrierError::InvalidArgument(format!(
                "unknown severity '{}'",
                other
            ))),
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Trace => Level::TRACE,
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error => Level::ERROR,
        }
    }
}

/// Observer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Severity every notification is emitted at; whether it is recorded is
    /// decided by the installed subscriber's filter
    pub severity: Severity,
}

/// Barrier settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    pub observer: ObserverConfig,
}

impl BarrierConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> BarrierResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(BarrierError::InvalidArgument(format!(
                    "configuration file {} does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loaded: BarrierConfig = settings.try_deserialize()?;

        tracing::debug!(
            severity = %loaded.observer.severity,
            source = ?path,
            "Loaded fault barrier configuration"
        );

        Ok(loaded)
    }
}
