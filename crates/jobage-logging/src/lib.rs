//! Logging configuration and subscriber setup for jobage.
//!
//! Engine crates only emit `tracing` events. Binaries call [`init`] once with
//! a [`LoggingConfig`], which becomes an `EnvFilter` plus a formatting layer
//! on stderr. A non-empty `JOBAGE_LOG` variable replaces the configured
//! directives entirely.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt as layer_fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding `EnvFilter` directives.
pub const LOG_ENV: &str = "JOBAGE_LOG";

/// Log level for filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "pretty" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level for every target
    #[serde(default)]
    pub level: LogLevel,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
    /// Prefix lines with a timestamp
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// ANSI colors (ignored by the JSON format)
    #[serde(default = "default_true")]
    pub colors: bool,
    /// Per-component levels, keyed by crate name (`jobage-report`) or
    /// tracing target (`jobage_report`)
    #[serde(default)]
    pub component_levels: BTreeMap<String, LogLevel>,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Plain,
            timestamps: true,
            colors: true,
            component_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_component_level(mut self, component: impl Into<String>, level: LogLevel) -> Self {
        self.component_levels.insert(component.into(), level);
        self
    }

    /// `EnvFilter` directives for this configuration, e.g.
    /// `info,jobage_report=debug`.
    pub fn directives(&self) -> String {
        std::iter::once(self.level.to_string())
            .chain(
                self.component_levels
                    .iter()
                    .map(|(component, level)| format!("{}={level}", target_name(component))),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Directives to install: `env_override` wins when it is non-blank.
    pub fn resolve_directives(&self, env_override: Option<&str>) -> String {
        match env_override.map(str::trim) {
            Some(directives) if !directives.is_empty() => directives.to_string(),
            _ => self.directives(),
        }
    }

    pub fn env_filter(&self, env_override: Option<&str>) -> anyhow::Result<EnvFilter> {
        let directives = self.resolve_directives(env_override);
        EnvFilter::try_new(&directives).with_context(|| format!("invalid log directives {directives:?}"))
    }
}

fn target_name(component: &str) -> String {
    component.replace('-', "_")
}

/// Install the global subscriber for `config`, writing to stderr.
///
/// Reads [`LOG_ENV`]. Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_override = std::env::var(LOG_ENV).ok();
    let filter = config.env_filter(env_override.as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);
    let base = layer_fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.colors);

    let installed = match (config.format, config.timestamps) {
        (LogFormat::Json, _) => registry
            .with(layer_fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Compact, true) => registry.with(base.compact()).try_init(),
        (LogFormat::Compact, false) => registry.with(base.compact().without_time()).try_init(),
        (LogFormat::Plain, true) => registry.with(base).try_init(),
        (LogFormat::Plain, false) => registry.with(base.without_time()).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;
    tracing::debug!(directives = %config.resolve_directives(env_override.as_deref()), "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
    }

    #[test]
    fn logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Plain);
        assert_eq!(config.directives(), "info");
    }

    #[test]
    fn crate_names_become_tracing_targets() {
        let config = LoggingConfig::new()
            .with_level(LogLevel::Warn)
            .with_component_level("jobage-report", LogLevel::Debug)
            .with_component_level("jobage_report", LogLevel::Trace);
        assert_eq!(config.component_levels.len(), 2);
        assert!(config.directives().starts_with("warn,"));
        assert!(config.directives().contains("jobage_report=debug"));
        assert!(config.env_filter(None).is_ok());
    }

    #[test]
    fn directives_use_tracing_targets() {
        let config = LoggingConfig::new()
            .with_level(LogLevel::Warn)
            .with_component_level("jobage-report", LogLevel::Debug)
            .with_component_level("jobage_filter", LogLevel::Trace);
        assert_eq!(config.directives(), "warn,jobage_filter=trace,jobage_report=debug");
        assert!(config.env_filter(None).is_ok());
    }

    #[test]
    fn env_override_replaces_directives() {
        let config = LoggingConfig::new().with_level(LogLevel::Error);
        assert_eq!(config.resolve_directives(Some("jobage_report=trace")), "jobage_report=trace");
        assert_eq!(config.resolve_directives(Some("   ")), "error");
        assert_eq!(config.resolve_directives(None), "error");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: LoggingConfig = serde_yaml::from_str("level: debug\nformat: json\n").unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.timestamps);
        assert!(config.component_levels.is_empty());

        let json = serde_json::to_string(&LoggingConfig::default()).unwrap();
        assert!(json.contains("\"level\":\"info\""));
    }
}
