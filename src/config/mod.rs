//! # Configuration Management Module
//!
//! Configuration for the progression store and the `wonderkids` CLI, loaded
//! from a TOML file with defaults for every value.
//!
//! ## Configuration Structure
//!
//! - [`StoreConfig`] - where and how the player document is persisted
//! - [`RulesConfig`] - reward tuning (XP per answer, level size, coin rewards)
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wonderkids::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration from file
//!     let config = Config::load("config.toml").await?;
//!     println!("State lives in: {}", config.store.data_dir);
//!
//!     // Create default configuration
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [store]
//! backend = "json"          # json | sled | memory
//! data_dir = "./data"
//! storage_key = "wonderkids_gamification"
//!
//! [rules]
//! xp_per_correct = 10
//! xp_per_level = 100
//! max_level = 100
//!
//! [logging]
//! level = "info"
//! file = "wonderkids.log"
//! ```
//!
//! Omitted sections and keys fall back to [`Config::default`], which carries
//! the standard reward rules.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::progress::leveling::{CATEGORY_XP_PER_LEVEL, MAX_LEVEL, XP_PER_LEVEL};
use crate::progress::storage::DEFAULT_STORAGE_KEY;
use crate::progress::types::STARTING_COINS;

/// Which [`crate::progress::storage::StateBackend`] holds the player document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `<data_dir>/<storage_key>.json`
    #[default]
    Json,
    /// Sled database at `<data_dir>/sled`
    Sled,
    /// Nothing persisted beyond the process
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Key the whole document is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Json,
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
        }
    }
}

/// Reward tuning. Defaults are the standard WonderKids rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Base XP for one correct answer
    pub xp_per_correct: u64,
    /// XP per global level
    pub xp_per_level: u64,
    /// Global level cap
    pub max_level: u32,
    /// Base coins for a finished game
    pub coin_reward_base: u64,
    /// Streak bonus factor, applied once the streak reaches `streak_bonus_threshold`
    pub streak_multiplier: f64,
    pub streak_bonus_threshold: u32,
    /// Coins a new player starts with
    pub starting_coins: u64,
    /// Flat XP for finishing a game
    pub play_xp: u64,
    /// Daily bonus before the streak multiplier
    pub daily_bonus_base: u64,
    /// Cap on the daily bonus multiplier
    pub daily_bonus_max_multiplier: f64,
    /// XP per category level
    pub category_xp_per_level: u64,
    /// Also advance the weekly challenge list
    pub track_weekly_challenges: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            xp_per_correct: 10,
            xp_per_level: XP_PER_LEVEL,
            max_level: MAX_LEVEL,
            coin_reward_base: 5,
            streak_multiplier: 0.1,
            streak_bonus_threshold: 5,
            starting_coins: STARTING_COINS,
            play_xp: 15,
            daily_bonus_base: 20,
            daily_bonus_max_multiplier: 2.0,
            category_xp_per_level: CATEGORY_XP_PER_LEVEL,
            track_weekly_challenges: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("wonderkids.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parse `level`; unknown names fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" | "warning" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => {
                eprintln!(
                    "Invalid log level '{}', defaulting to info",
                    self.level
                );
                log::LevelFilter::Info
            }
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject settings that would break the level math or the store.
    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        if rules.xp_per_level == 0 {
            return Err(anyhow!("rules.xp_per_level must be greater than 0"));
        }
        if rules.max_level == 0 {
            return Err(anyhow!("rules.max_level must be at least 1"));
        }
        if rules.category_xp_per_level == 0 {
            return Err(anyhow!("rules.category_xp_per_level must be greater than 0"));
        }
        if !rules.streak_multiplier.is_finite() || rules.streak_multiplier < 0.0 {
            return Err(anyhow!("rules.streak_multiplier must be a non-negative number"));
        }
        if !rules.daily_bonus_max_multiplier.is_finite() || rules.daily_bonus_max_multiplier < 1.0 {
            return Err(anyhow!("rules.daily_bonus_max_multiplier must be at least 1.0"));
        }
        if self.store.storage_key.trim().is_empty() {
            return Err(anyhow!("store.storage_key must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_match_standard_rewards() {
        let rules = RulesConfig::default();
        assert_eq!(rules.xp_per_correct, 10);
        assert_eq!(rules.xp_per_level, 100);
        assert_eq!(rules.max_level, 100);
        assert_eq!(rules.coin_reward_base, 5);
        assert_eq!(rules.starting_coins, 50);
        assert_eq!(rules.play_xp, 15);
        assert_eq!(rules.daily_bonus_base, 20);
        assert_eq!(rules.category_xp_per_level, 200);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.store.backend, BackendKind::Json);
        assert_eq!(config.store.storage_key, "wonderkids_gamification");
        assert_eq!(config.rules, RulesConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [store]
            backend = "sled"
            data_dir = "/tmp/wk"

            [rules]
            play_xp = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, BackendKind::Sled);
        assert_eq!(config.store.data_dir, "/tmp/wk");
        assert_eq!(config.store.storage_key, "wonderkids_gamification");
        assert_eq!(config.rules.play_xp, 25);
        assert_eq!(config.rules.xp_per_correct, 10);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            "[rules]\nxp_per_level = 0",
            "[rules]\nmax_level = 0",
            "[rules]\nstreak_multiplier = -0.5",
            "[rules]\ndaily_bonus_max_multiplier = 0.5",
            "[store]\nstorage_key = \"\"",
            "[store]\nbackend = \"postgres\"",
        ];
        for case in cases {
            assert!(Config::from_toml(case).is_err(), "expected rejection: {}", case);
        }
    }

    #[test]
    fn level_filter_parsing() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
        logging.level = "DEBUG".into();
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
        logging.level = "chatty".into();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn default_config_survives_toml_round_trip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.rules, RulesConfig::default());
        assert_eq!(parsed.store.data_dir, "./data");
    }

    #[test]
    fn load_and_create_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap().to_string();
        tokio_test::block_on(async {
            Config::create_default(&path).await.unwrap();
            let loaded = Config::load(&path).await.unwrap();
            assert_eq!(loaded.rules, RulesConfig::default());
            assert!(Config::load("/definitely/not/here.toml").await.is_err());
        });
    }
}
