//! Configuration management

use crate::segment::SegmentMode;
use crate::speech::params::{VoiceParams, MAX_SCALE, MIN_SCALE};
use crate::{LectorError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::PathBuf;

/// Application configuration
///
/// Persists speech parameters and the segment mode between sessions in an
/// INI file at `~/.lector.cfg`.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location or create it
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path, writing defaults if absent
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| LectorError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| LectorError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| LectorError::Config(format!("Failed to save config: {}", e)))
    }

    /// Default config file path (~/.lector.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lector.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("rate", "1.0")
            .set("pitch", "1.0");

        ini.with_section(Some("reader"))
            .set("mode", SegmentMode::Sentence.name());

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Reader-specific configuration getters

    /// Speech rate multiplier; out-of-range values fall back to 1.0
    pub fn rate(&self) -> f32 {
        let rate = self.get_float("speech", "rate", 1.0);
        if (MIN_SCALE..=MAX_SCALE).contains(&rate) {
            rate
        } else {
            1.0
        }
    }

    /// Speech pitch multiplier; out-of-range values fall back to 1.0
    pub fn pitch(&self) -> f32 {
        let pitch = self.get_float("speech", "pitch", 1.0);
        if (MIN_SCALE..=MAX_SCALE).contains(&pitch) {
            pitch
        } else {
            1.0
        }
    }

    /// Selected voice id, if any
    pub fn voice_id(&self) -> Option<String> {
        self.ini
            .get_from(Some("speech"), "voice")
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// Language tag used to pick a voice when no id is configured
    pub fn lang(&self) -> Option<String> {
        self.ini
            .get_from(Some("speech"), "lang")
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// Segment mode; unknown names fall back to sentence mode
    pub fn mode(&self) -> SegmentMode {
        SegmentMode::parse(&self.get_string("reader", "mode", "sentence"))
            .unwrap_or(SegmentMode::Sentence)
    }

    /// Voice parameters assembled from the configured values
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            voice_id: self.voice_id(),
            rate: self.rate(),
            pitch: self.pitch(),
            lang: self.lang(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("lector.cfg")).unwrap();

        assert_eq!(config.rate(), 1.0);
        assert_eq!(config.pitch(), 1.0);
        assert_eq!(config.voice_id(), None);
        assert_eq!(config.mode(), SegmentMode::Sentence);
    }

    #[test]
    fn test_out_of_range_rate_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().join("lector.cfg")).unwrap();
        config.set("speech", "rate", "50");
        assert_eq!(config.rate(), 1.0);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lector.cfg");

        let mut config = Config::load_from(path.clone()).unwrap();
        config.set("speech", "rate", "1.5");
        config.set("speech", "voice", "en-gb-1");
        config.set("reader", "mode", "page");
        config.save().unwrap();

        let reloaded = Config::load_from(path).unwrap();
        assert_eq!(reloaded.rate(), 1.5);
        assert_eq!(reloaded.voice_id().as_deref(), Some("en-gb-1"));
        assert_eq!(reloaded.mode(), SegmentMode::Page);
    }
}
