//! Engine configuration
//!
//! Every field has a default so a config file only needs the values it
//! changes. Command-line flags override whatever the file provides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::placement::PlacementConfig;
use crate::error::GuidepostError;

/// Relaxed trigger rule for the distinguished first-launch flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstLaunchConfig {
    /// Flow started on the first eligible route
    pub flow_id: String,
    /// Routes where the first-launch flow must never start (login, landing)
    pub deny_routes: Vec<String>,
}

impl Default for FirstLaunchConfig {
    fn default() -> Self {
        Self {
            flow_id: "welcome".to_string(),
            deny_routes: vec!["/".to_string(), "/login".to_string()],
        }
    }
}

/// Tour engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between a matching route change and the auto-start
    pub settle_delay_ms: u64,
    /// Debounce applied to scroll/resize relocation
    pub relocate_debounce_ms: u64,
    /// Callout padding and arrow gap
    pub placement: PlacementConfig,
    /// Breathing room between the target and the spotlight hole
    pub spotlight_padding: i32,
    /// Period of the highlight ring pulse
    pub pulse_period_ms: u64,
    /// Maximum callout width including borders
    pub callout_max_width: u16,
    /// First-launch flow rule, disabled when `None`
    pub first_launch: Option<FirstLaunchConfig>,
    /// Whether skipping a flow records it as completed
    pub skip_counts_as_completion: bool,
    /// Completion state file, in-memory only when `None`
    pub state_file: Option<PathBuf>,
    /// Flow registry file, built-in catalog when `None`
    pub flows_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            relocate_debounce_ms: 50,
            placement: PlacementConfig::default(),
            spotlight_padding: 1,
            pulse_period_ms: 1200,
            callout_max_width: 44,
            first_launch: Some(FirstLaunchConfig::default()),
            skip_counts_as_completion: true,
            state_file: None,
            flows_file: None,
        }
    }
}

impl EngineConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn relocate_debounce(&self) -> Duration {
        Duration::from_millis(self.relocate_debounce_ms)
    }

    pub fn pulse_period(&self) -> Duration {
        Duration::from_millis(self.pulse_period_ms)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.placement.pad < 0 || self.placement.arrow_gap < 0 {
            return Err(GuidepostError::config(
                "Placement padding and arrow gap must not be negative",
            ));
        }
        if self.spotlight_padding < 0 {
            return Err(GuidepostError::config("Spotlight padding must not be negative"));
        }
        if self.pulse_period_ms == 0 {
            return Err(GuidepostError::config("Pulse period must be greater than zero"));
        }
        if self.callout_max_width < 12 {
            return Err(GuidepostError::config("Callout width must be at least 12 columns"));
        }
        if let Some(first) = &self.first_launch {
            if first.flow_id.trim().is_empty() {
                return Err(GuidepostError::config("First-launch flow id must not be empty"));
            }
            if let Some(bad) = first.deny_routes.iter().find(|r| !r.starts_with('/')) {
                return Err(GuidepostError::config(format!(
                    "Deny-listed route '{}' must start with '/'",
                    bad
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert!(config.skip_counts_as_completion);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{ "settle_delay_ms": 900, "first_launch": null }"#)
            .unwrap();
        temp_file.flush().unwrap();

        let config = EngineConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.settle_delay_ms, 900);
        assert!(config.first_launch.is_none());
        assert_eq!(config.callout_max_width, 44);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = EngineConfig::default();
        config.pulse_period_ms = 800;
        config.save_to_file(temp_file.path()).unwrap();

        let loaded = EngineConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();
        assert!(EngineConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_validation_rejects_relative_deny_route() {
        let mut config = EngineConfig::default();
        config.first_launch = Some(FirstLaunchConfig {
            flow_id: "welcome".to_string(),
            deny_routes: vec!["login".to_string()],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_padding() {
        let mut config = EngineConfig::default();
        config.placement.pad = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_reports_configuration_error() {
        let mut config = EngineConfig::default();
        config.pulse_period_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GuidepostError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Pulse period must be greater than zero"
        );
    }
}
