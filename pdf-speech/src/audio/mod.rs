//! Audio segments and WAV persistence.

pub mod wav;

pub use wav::write_wav;
#[cfg(test)]
pub use wav::{read_wav, wav_sample_count};

/// Sample rate of everything the synthesis engine produces.
pub const SAMPLE_RATE: u32 = 24000;

/// Mono PCM samples in [-1.0, 1.0] at `SAMPLE_RATE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSegment {
    pub samples: Vec<f32>,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    /// Concatenate segments in order.
    pub fn concat<'a>(segments: impl IntoIterator<Item = &'a AudioSegment>) -> AudioSegment {
        let mut samples = Vec::new();
        for segment in segments {
            samples.extend_from_slice(&segment.samples);
        }
        AudioSegment { samples }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_preserves_order() {
        let a = AudioSegment::new(vec![0.1, 0.2]);
        let b = AudioSegment::new(vec![0.3]);
        let combined = AudioSegment::concat([&a, &b]);
        assert_eq!(combined.samples, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_concat_empty() {
        let combined = AudioSegment::concat(std::iter::empty());
        assert!(combined.is_empty());
    }

    #[test]
    fn test_duration() {
        let segment = AudioSegment::new(vec![0.0; 12000]);
        assert!((segment.duration_secs() - 0.5).abs() < f64::EPSILON);
    }
}
