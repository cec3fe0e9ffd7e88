//! Configuration
//!
//! Optional TOML file with per-field defaults. Command-line flags override
//! whatever the file sets. Script timings are not configurable.
//!
//! ```toml
//! [ui]
//! tick_rate_ms = 50
//! start_tab = "llm"
//!
//! [log]
//! file = "vizlab.log"
//! level = "debug"
//! ```

use crate::ui::Tab;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw and input poll interval in milliseconds
    pub tick_rate_ms: u64,

    /// Tab shown on start and after a reset
    pub start_tab: Tab,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            start_tab: Tab::Blockchain,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Log destination while the TUI owns the terminal
    pub file: PathBuf,

    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("vizlab.log"),
            level: "info".to_string(),
        }
    }
}

fn default_tick_rate_ms() -> u64 {
    50
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ui.tick_rate_ms == 0 {
            bail!("ui.tick_rate_ms must be greater than zero");
        }
        self.log_level()?;
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }

    pub fn log_level(&self) -> Result<Level> {
        self.log
            .level
            .parse::<Level>()
            .map_err(|_| anyhow::anyhow!("Unknown log level: {}", self.log.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert_eq!(config.ui.start_tab, Tab::Blockchain);
        assert_eq!(config.log.file, PathBuf::from("vizlab.log"));
        assert_eq!(config.log_level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [ui]
            start_tab = "llm"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.ui.start_tab, Tab::Llm);
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert_eq!(config.log_level().unwrap(), Level::DEBUG);
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::parse("[ui]\ntick_rate_ms = 0").is_err());
        assert!(Config::parse("[log]\nlevel = \"loud\"").is_err());
        assert!(Config::parse("[ui]\nstart_tab = \"nowhere\"").is_err());
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = Config::load(Path::new("/nonexistent/vizlab.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
