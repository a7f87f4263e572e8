//! Configuration file support for Weekplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/weekplan/config.toml` and
//! supplies the athlete profile plus where the training log lives.

use crate::{Error, Result, SwimDay, UserProfile};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: UserProfile,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_history_csv")]
    pub history_csv: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_csv: default_history_csv(),
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            ftp: default_ftp(),
            timezone: default_timezone(),
            swim_days: default_swim_days(),
            bike_vo2_day: Weekday::Thu,
            long_bike_day: Weekday::Sun,
            no_long_run_day: Weekday::Sun,
        }
    }
}

// Default value functions
fn default_history_csv() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".local/share"));
    base.join("weekplan").join("history.csv")
}

fn default_ftp() -> u32 {
    355
}

fn default_timezone() -> String {
    "UTC".into()
}

fn default_swim_days() -> Vec<SwimDay> {
    vec![
        SwimDay::Day(Weekday::Wed),
        SwimDay::Day(Weekday::Fri),
        SwimDay::SunOptional,
    ]
}

impl Config {
    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        base.join("weekplan").join("config.toml")
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = Config::default().profile;
        assert_eq!(profile.ftp, 355);
        assert_eq!(profile.bike_vo2_day, Weekday::Thu);
        assert_eq!(profile.long_bike_day, Weekday::Sun);
        assert_eq!(profile.no_long_run_day, Weekday::Sun);
        assert!(profile.swims_on(Weekday::Wed));
        assert!(profile.swims_on(Weekday::Fri));
        assert!(!profile.swims_on(Weekday::Sun));
        assert!(profile.wants_sunday_recovery_swim());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.profile, parsed.profile);
        assert_eq!(config.data.history_csv, parsed.data.history_csv);
    }

    #[test]
    fn test_profile_section_parses_tokens() {
        let toml_str = r#"
[profile]
ftp = 280
timezone = "Europe/Madrid"
swim_days = ["Wed", "Sun_optional"]
bike_vo2_day = "Tue"
long_bike_day = "Sat"
no_long_run_day = "Sat"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.profile.ftp, 280);
        assert_eq!(
            config.profile.swim_days,
            vec![SwimDay::Day(Weekday::Wed), SwimDay::SunOptional]
        );
        assert_eq!(config.profile.bike_vo2_day, Weekday::Tue);
        assert!(!config.profile.swims_on(Weekday::Fri));
    }

    #[test]
    fn test_bad_swim_day_rejected() {
        let toml_str = r#"
[profile]
ftp = 280
timezone = "UTC"
swim_days = ["Caturday"]
bike_vo2_day = "Thu"
long_bike_day = "Sun"
no_long_run_day = "Sun"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profile.ftp = 300;
        config.save_to(&path).unwrap();

        let loaded = Config::load_or_default(&path).unwrap();
        assert_eq!(loaded.profile.ftp, 300);

        let missing = Config::load_or_default(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing.profile.ftp, 355);
    }

    #[test]
    fn test_load_partial_profile_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[profile]\nftp = 240\n").unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.profile.ftp, 240);
        assert_eq!(config.profile.bike_vo2_day, Weekday::Thu);
        assert!(config.profile.wants_sunday_recovery_swim());
        assert_eq!(config.data.history_csv, default_history_csv());
    }
}
