//! Configuration management and loading for jobage.

use anyhow::Context;
use jobage_bucket::NegativeDurationPolicy;
use jobage_error::EngineError;
use jobage_filter::ExclusionRule;
use jobage_logging::LoggingConfig;
use jobage_schema::BandCatalog;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration format types supported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Format implied by a file extension; anything unknown is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// One band of the configured catalog, given by its lower bound.
///
/// The band ends where the next one starts; the last band is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub from: u32,
}

impl BandSpec {
    pub fn new(from: u32) -> Self {
        Self { label: None, from }
    }

    pub fn labelled(label: impl Into<String>, from: u32) -> Self {
        Self {
            label: Some(label.into()),
            from,
        }
    }
}

/// Engine configuration, passed explicitly into every entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Centers reported individually, in display order
    #[serde(default = "default_main_centers")]
    pub main_centers: Vec<String>,

    /// Duration band catalog
    #[serde(default = "default_bands")]
    pub bands: Vec<BandSpec>,

    /// Handling of creation times later than the reference instant
    #[serde(default)]
    pub negative_durations: NegativeDurationPolicy,

    /// Filter combinations that can never match
    #[serde(default = "ExclusionRule::default_rules")]
    pub exclusion_rules: Vec<ExclusionRule>,

    /// Logging setup used by the CLI
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The three service centers the dashboard tracks by default.
pub const DEFAULT_MAIN_CENTERS: [&str; 3] = [
    "MM-1.Care-MSC-Yangon-Hledan",
    "MM-1.Care-MSC-Mandalay-35street",
    "MM-1.Care-MSC-MawLaMyine",
];

fn default_main_centers() -> Vec<String> {
    DEFAULT_MAIN_CENTERS.iter().map(|c| c.to_string()).collect()
}

fn default_bands() -> Vec<BandSpec> {
    BandCatalog::STANDARD_BOUNDS.iter().map(|&b| BandSpec::new(b)).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            main_centers: default_main_centers(),
            bands: default_bands(),
            negative_durations: NegativeDurationPolicy::default(),
            exclusion_rules: ExclusionRule::default_rules(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_main_centers<I, S>(mut self, centers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.main_centers = centers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bands(mut self, bands: Vec<BandSpec>) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_negative_durations(mut self, policy: NegativeDurationPolicy) -> Self {
        self.negative_durations = policy;
        self
    }

    pub fn with_exclusion_rules(mut self, rules: Vec<ExclusionRule>) -> Self {
        self.exclusion_rules = rules;
        self
    }

    /// Validated band catalog for this configuration.
    pub fn band_catalog(&self) -> Result<BandCatalog, EngineError> {
        BandCatalog::from_lower_bounds(self.bands.iter().map(|b| (b.label.clone(), b.from)))
    }

    pub fn is_main_center(&self, center: &str) -> bool {
        self.main_centers.iter().any(|c| c == center)
    }

    /// Main centers must be non-blank and listed once each.
    pub fn check_main_centers(&self) -> Result<(), EngineError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.main_centers.len());
        for center in &self.main_centers {
            if center.trim().is_empty() {
                return Err(EngineError::InvalidConfig("blank main center".into()));
            }
            if seen.contains(&center.as_str()) {
                return Err(EngineError::InvalidConfig(format!("main center {center:?} is listed twice")));
            }
            seen.push(center);
        }
        Ok(())
    }

    /// Reject configurations that would fail later at report time.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.band_catalog()?;
        self.check_main_centers()?;
        Ok(())
    }
}

/// Parse configuration text in the given format and validate it.
pub fn parse_config(contents: &str, format: ConfigFormat) -> anyhow::Result<EngineConfig> {
    let config: EngineConfig = match format {
        ConfigFormat::Json => serde_json::from_str(contents).context("failed to parse JSON config")?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents).context("failed to parse YAML config")?,
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Load configuration from a file; the format follows the extension.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<EngineConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).with_context(|| format!("read config {path:?}"))?;
    let config = parse_config(&contents, ConfigFormat::from_path(path))
        .with_context(|| format!("load config {path:?}"))?;
    tracing::debug!(
        path = %path.display(),
        main_centers = config.main_centers.len(),
        bands = config.bands.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load `path` when given, otherwise the defaults.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Save configuration to a file
pub fn save_config(config: &EngineConfig, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let contents = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::to_string_pretty(config).context("failed to serialize JSON config")?,
        ConfigFormat::Yaml => serde_yaml::to_string(config).context("failed to serialize YAML config")?,
    };
    std::fs::write(path, contents).with_context(|| format!("write config {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobage_filter::FilterField;
    use jobage_logging::LogLevel;
    use tempfile::TempDir;

    #[test]
    fn config_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.main_centers.len(), 3);
        assert!(config.is_main_center("MM-1.Care-MSC-Yangon-Hledan"));
        assert!(!config.is_main_center("MM-2.Partner-Bago"));
        assert_eq!(config.negative_durations, NegativeDurationPolicy::Reject);
        assert_eq!(config.exclusion_rules, ExclusionRule::default_rules());
        assert_eq!(config.band_catalog().unwrap(), BandCatalog::standard());
    }

    #[test]
    fn empty_document_means_defaults() {
        let config = parse_config("{}", ConfigFormat::Json).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn yaml_overrides_bands_and_centers() {
        let yaml = "\
main_centers:
  - North
  - South
bands:
  - { label: fresh, from: 0 }
  - { from: 7 }
  - { label: stale, from: 30 }
negative_durations: clamp
logging:
  level: debug
";
        let config = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.main_centers, ["North", "South"]);
        assert_eq!(config.negative_durations, NegativeDurationPolicy::Clamp);
        assert_eq!(config.logging.level, LogLevel::Debug);

        let catalog = config.band_catalog().unwrap();
        let labels: Vec<_> = catalog.labels().collect();
        assert_eq!(labels, ["fresh", "7-30", "stale"]);
        assert_eq!(catalog.position(8), Some(1));
    }

    #[test]
    fn gapped_bands_are_rejected() {
        let yaml = "bands:\n  - { from: 2 }\n  - { from: 10 }\n";
        let err = parse_config(yaml, ConfigFormat::Yaml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid configuration"));
    }

    #[test]
    fn duplicate_main_centers_are_rejected() {
        let config = EngineConfig::default().with_main_centers(["A", "A"]);
        assert!(config.validate().is_err());
        assert!(matches!(config.check_main_centers(), Err(EngineError::InvalidConfig(_))));

        let blank = EngineConfig::default().with_main_centers(["A", " "]);
        assert!(matches!(blank.check_main_centers(), Err(EngineError::InvalidConfig(_))));
        assert!(EngineConfig::default().check_main_centers().is_ok());
    }

    #[test]
    fn exclusion_rules_deserialize() {
        let json = r#"{"exclusion_rules":[{"when_field":"warranty_status","when_value":"OOW","excluded_field":"service_type","excluded_value":"Inspection"}]}"#;
        let config = parse_config(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.exclusion_rules.len(), 1);
        assert_eq!(config.exclusion_rules[0].when_field, FilterField::WarrantyStatus);

        let none = parse_config(r#"{"exclusion_rules":[]}"#, ConfigFormat::Json).unwrap();
        assert!(none.exclusion_rules.is_empty());
    }

    #[test]
    fn load_save_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("jobage.yaml");

        let config = EngineConfig::default()
            .with_main_centers(["Center A"])
            .with_bands(vec![BandSpec::new(0), BandSpec::labelled("old", 14)])
            .with_negative_durations(NegativeDurationPolicy::Clamp);

        save_config(&config, &config_path).unwrap();
        let loaded = load_config(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_save_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("jobage.json");

        let config = EngineConfig::default().with_exclusion_rules(Vec::new());
        save_config(&config, &config_path).unwrap();
        let loaded = load_config(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yaml");
        let err = load_config(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nope.yaml"));
        assert!(load_or_default(None).is_ok());
    }
}
