//! pdf-speech configuration management.

use crate::text::DEFAULT_CHAR_LIMIT;
use crate::tts::DEFAULT_VOICE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_SPEED: f32 = 1.0;
const DEFAULT_LANG_CODE: &str = "a";

/// Accepted speed range.
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfSpeechConfig {
    /// Maximum characters per synthesis request
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,

    /// Kokoro voice identifier
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speech speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Kokoro language code ("a" = American English, "b" = British English)
    #[serde(default = "default_lang_code")]
    pub lang_code: String,

    /// Directory for generated audio. None means the Downloads directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Open the output directory in the file browser after a successful run
    #[serde(default = "default_reveal_output")]
    pub reveal_output: bool,

    /// site-packages of a Python venv with kokoro installed
    #[serde(default)]
    pub python_site_packages: Option<PathBuf>,
}

fn default_char_limit() -> usize {
    DEFAULT_CHAR_LIMIT
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_lang_code() -> String {
    DEFAULT_LANG_CODE.to_string()
}

fn default_reveal_output() -> bool {
    true
}

impl Default for PdfSpeechConfig {
    fn default() -> Self {
        Self {
            char_limit: default_char_limit(),
            voice: default_voice(),
            speed: default_speed(),
            lang_code: default_lang_code(),
            output_dir: None,
            reveal_output: default_reveal_output(),
            python_site_packages: None,
        }
    }
}

impl PdfSpeechConfig {
    /// Get the config file path: ~/.config/cli-programs/pdf-speech.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("pdf-speech.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: PdfSpeechConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.char_limit == 0 {
            anyhow::bail!("char_limit must be at least 1");
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            anyhow::bail!(
                "speed must be between {} and {}, got {}",
                MIN_SPEED,
                MAX_SPEED,
                self.speed
            );
        }
        if self.voice.trim().is_empty() {
            anyhow::bail!("voice must not be empty");
        }
        Ok(())
    }

    /// Output directory, falling back to Downloads, then home, then `.`.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }
}

/// The user's Downloads directory, or home if there is none.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PdfSpeechConfig::default();
        assert_eq!(config.char_limit, 4095);
        assert_eq!(config.voice, "af_heart");
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.lang_code, "a");
        assert!(config.output_dir.is_none());
        assert!(config.reveal_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_path() {
        let path = PdfSpeechConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("cli-programs/pdf-speech.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
char_limit = 2000
voice = "bf_emma"
speed = 1.5
lang_code = "b"
output_dir = "/tmp/audio"
reveal_output = false
"#;
        let config: PdfSpeechConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.char_limit, 2000);
        assert_eq!(config.voice, "bf_emma");
        assert_eq!(config.speed, 1.5);
        assert_eq!(config.lang_code, "b");
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/audio")));
        assert!(!config.reveal_output);
        assert_eq!(config.resolved_output_dir(), PathBuf::from("/tmp/audio"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: PdfSpeechConfig = toml::from_str("").unwrap();
        assert_eq!(config, PdfSpeechConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PdfSpeechConfig::default();
        config.char_limit = 0;
        assert!(config.validate().is_err());

        let mut config = PdfSpeechConfig::default();
        config.speed = 0.0;
        assert!(config.validate().is_err());

        let mut config = PdfSpeechConfig::default();
        config.speed = 50.0;
        assert!(config.validate().is_err());

        let mut config = PdfSpeechConfig::default();
        config.voice = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = PdfSpeechConfig::default();
        config.output_dir = Some(PathBuf::from("/data/speech"));
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: PdfSpeechConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
