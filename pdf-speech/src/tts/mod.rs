//! TTS backend trait and types.

#[cfg(feature = "kokoro")]
pub mod kokoro;

use crate::audio::AudioSegment;
use crate::config::PdfSpeechConfig;
use anyhow::Result;
use async_trait::async_trait;

/// Default Kokoro voice.
pub const DEFAULT_VOICE: &str = "af_heart";

/// Sentence-boundary split pattern handed to the engine.
pub const SENTENCE_SPLIT_PATTERN: &str = r"(?<=[.?!])\s+";

/// Options for one synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Voice identifier (e.g. "af_heart")
    pub voice: String,
    /// Speed multiplier (1.0 = normal)
    pub speed: f32,
    /// Regex the engine uses to split a chunk into sub-segments
    pub split_pattern: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            speed: 1.0,
            split_pattern: SENTENCE_SPLIT_PATTERN.to_string(),
        }
    }
}

impl SynthesisOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the speed multiplier.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// One sub-segment produced by the engine.
#[derive(Debug, Clone)]
pub struct SynthesizedSegment {
    /// Text the engine spoke for this segment
    pub graphemes: String,
    /// Phoneme string the engine generated
    pub phonemes: String,
    pub audio: AudioSegment,
}

/// TTS backend trait - all TTS engines implement this.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize one chunk into ordered sub-segments at `audio::SAMPLE_RATE`.
    async fn synthesize(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Vec<SynthesizedSegment>>;

    /// Human-readable engine name for diagnostics.
    fn name(&self) -> &str;
}

/// Create the TTS backend selected by the configuration.
#[cfg(feature = "kokoro")]
pub fn create_backend(config: &PdfSpeechConfig) -> Result<Box<dyn TtsBackend>> {
    Ok(Box::new(kokoro::KokoroBackend::new(
        &config.lang_code,
        config.python_site_packages.clone(),
    )?))
}

/// Create the TTS backend selected by the configuration.
#[cfg(not(feature = "kokoro"))]
pub fn create_backend(_config: &PdfSpeechConfig) -> Result<Box<dyn TtsBackend>> {
    anyhow::bail!(
        "pdf-speech was built without a speech engine. Rebuild with `--features kokoro`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_options_default() {
        let opts = SynthesisOptions::default();
        assert_eq!(opts.voice, "af_heart");
        assert_eq!(opts.speed, 1.0);
        assert_eq!(opts.split_pattern, r"(?<=[.?!])\s+");
    }

    #[test]
    fn test_synthesis_options_builder() {
        let opts = SynthesisOptions::new().with_voice("bf_emma").with_speed(1.25);
        assert_eq!(opts.voice, "bf_emma");
        assert_eq!(opts.speed, 1.25);
    }

    #[cfg(not(feature = "kokoro"))]
    #[test]
    fn test_create_backend_without_engine() {
        let err = create_backend(&PdfSpeechConfig::default()).err().unwrap();
        assert!(err.to_string().contains("--features kokoro"));
    }
}
