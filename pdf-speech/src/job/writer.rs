//! Chunk synthesis and WAV assembly.
//!
//! For each chunk the engine returns ordered sub-segments; they are joined into
//! `{base}_chunk{N}.wav`. After the last chunk every chunk's audio is joined into
//! `{base}_complete.wav` and the chunk files are removed.

use super::{JobError, JobOutput};
use crate::audio::{AudioSegment, SAMPLE_RATE, write_wav};
use crate::text::TextChunk;
use crate::tts::{SynthesisOptions, TtsBackend};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Forwards progress percentages, clamped to [0, 100] and never decreasing.
pub struct ProgressTracker<F> {
    last: f64,
    sink: F,
}

impl<F: FnMut(f64)> ProgressTracker<F> {
    pub fn new(sink: F) -> Self {
        Self { last: 0.0, sink }
    }

    pub fn report(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0).max(self.last);
        self.last = percent;
        (self.sink)(percent);
    }

    #[cfg(test)]
    pub fn last(&self) -> f64 {
        self.last
    }
}

/// Overall progress after `done` of `in_chunk` sub-segments of chunk `index`
/// out of `total` chunks.
pub fn overall_progress(index: usize, done: usize, in_chunk: usize, total: usize) -> f64 {
    let in_chunk = in_chunk.max(1);
    let total = total.max(1);
    100.0 * (index as f64 + done as f64 / in_chunk as f64) / total as f64
}

/// Path of the per-chunk file for chunk `index` (0-indexed).
pub fn chunk_path(output_dir: &Path, base_name: &str, index: usize) -> PathBuf {
    output_dir.join(format!("{}_chunk{}.wav", base_name, index + 1))
}

/// Path of the combined output file.
pub fn complete_path(output_dir: &Path, base_name: &str) -> PathBuf {
    output_dir.join(format!("{}_complete.wav", base_name))
}

/// Chunk audio kept in memory, plus the files it was written to.
#[derive(Debug, Default)]
pub struct WrittenChunks {
    pub audio: Vec<AudioSegment>,
    pub files: Vec<PathBuf>,
}

/// Synthesizes chunks and writes the resulting audio files.
pub struct ChunkWriter<'a> {
    backend: &'a dyn TtsBackend,
    options: SynthesisOptions,
    output_dir: PathBuf,
    base_name: String,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(
        backend: &'a dyn TtsBackend,
        options: SynthesisOptions,
        output_dir: PathBuf,
        base_name: String,
    ) -> Self {
        Self {
            backend,
            options,
            output_dir,
            base_name,
        }
    }

    /// Synthesize every chunk, write the per-chunk files, then the combined
    /// file, then remove the per-chunk files.
    ///
    /// On failure, chunk files already written stay on disk.
    pub async fn write_all<F>(
        &self,
        chunks: &[TextChunk],
        progress: &mut ProgressTracker<F>,
    ) -> Result<JobOutput, JobError>
    where
        F: FnMut(f64) + Send,
    {
        let written = self.write_chunks(chunks, progress).await?;
        let output = self.write_complete(&written).await?;
        remove_chunk_files(&written.files);
        Ok(output)
    }

    /// Synthesize and persist each chunk in order.
    pub async fn write_chunks<F>(
        &self,
        chunks: &[TextChunk],
        progress: &mut ProgressTracker<F>,
    ) -> Result<WrittenChunks, JobError>
    where
        F: FnMut(f64) + Send,
    {
        let mut written = WrittenChunks::default();
        if chunks.is_empty() {
            return Ok(written);
        }

        fs::create_dir_all(&self.output_dir).map_err(|source| JobError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            info!("Processing chunk {} ({} chars)...", chunk.index + 1, chunk.char_len());

            let segments = self
                .backend
                .synthesize(&chunk.text, &self.options)
                .await
                .map_err(|e| JobError::Synthesis {
                    chunk: i + 1,
                    message: format!("{:#}", e),
                })?;

            if segments.is_empty() {
                warn!("Chunk {} produced no audio", i + 1);
                progress.report(overall_progress(i, 1, 1, total));
                continue;
            }

            let in_chunk = segments.len();
            for (k, segment) in segments.iter().enumerate() {
                debug!("  [{}/{}] {} /{}/", k + 1, in_chunk, segment.graphemes, segment.phonemes);
                progress.report(overall_progress(i, k + 1, in_chunk, total));
            }

            let audio = AudioSegment::concat(segments.iter().map(|s| &s.audio));
            if audio.is_empty() {
                warn!("Chunk {} produced only empty segments", i + 1);
            }
            let path = chunk_path(&self.output_dir, &self.base_name, i);
            let audio = write_wav_blocking(path.clone(), audio).await?;
            debug!("Wrote {} ({:.1}s)", path.display(), audio.duration_secs());

            written.files.push(path);
            written.audio.push(audio);
        }

        Ok(written)
    }

    /// Join all chunk audio into `{base}_complete.wav`.
    pub async fn write_complete(&self, written: &WrittenChunks) -> Result<JobOutput, JobError> {
        if written.audio.is_empty() {
            return Err(JobError::NoAudio);
        }

        let combined = AudioSegment::concat(&written.audio);
        let path = complete_path(&self.output_dir, &self.base_name);
        let combined = write_wav_blocking(path.clone(), combined).await?;
        info!("Wrote {} ({:.1}s)", path.display(), combined.duration_secs());

        Ok(JobOutput {
            path,
            chunk_count: written.audio.len(),
            sample_count: combined.len(),
        })
    }
}

/// Write a WAV on the blocking pool, handing the audio back afterwards.
async fn write_wav_blocking(path: PathBuf, audio: AudioSegment) -> Result<AudioSegment, JobError> {
    tokio::task::spawn_blocking(move || write_wav(&path, &audio, SAMPLE_RATE).map(|()| audio))
        .await
        .map_err(|e| JobError::Write(format!("Task join error: {}", e)))?
        .map_err(|e| JobError::Write(format!("{:#}", e)))
}

/// Delete per-chunk files. Failures are logged, never fatal.
///
/// Returns the number of files removed.
pub fn remove_chunk_files(files: &[PathBuf]) -> usize {
    let mut removed = 0;
    for file in files {
        match fs::remove_file(file) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not delete {}: {}", file.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav_sample_count;
    use crate::job::test_support::ScriptedBackend;
    use tempfile::TempDir;

    fn chunks(texts: &[&str]) -> Vec<TextChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextChunk::new(i, t.to_string()))
            .collect()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("/out");
        assert_eq!(chunk_path(dir, "book", 0), PathBuf::from("/out/book_chunk1.wav"));
        assert_eq!(complete_path(dir, "book"), PathBuf::from("/out/book_complete.wav"));
    }

    #[test]
    fn test_overall_progress() {
        assert_eq!(overall_progress(0, 1, 2, 2), 25.0);
        assert_eq!(overall_progress(1, 2, 2, 2), 100.0);
        assert_eq!(overall_progress(0, 1, 0, 1), 100.0);
    }

    #[test]
    fn test_progress_tracker_is_monotonic_and_clamped() {
        let mut seen = Vec::new();
        {
            let mut tracker = ProgressTracker::new(|p| seen.push(p));
            tracker.report(10.0);
            tracker.report(5.0);
            tracker.report(150.0);
            assert_eq!(tracker.last(), 100.0);
        }
        assert_eq!(seen, vec![10.0, 10.0, 100.0]);
    }

    #[tokio::test]
    async fn test_two_chunks_written_then_cleaned_up() {
        let temp_dir = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(3, 100);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            temp_dir.path().to_path_buf(),
            "doc".to_string(),
        );
        let mut progress = ProgressTracker::new(|_| {});

        let written = writer
            .write_chunks(&chunks(&["One.", "Two."]), &mut progress)
            .await
            .unwrap();
        let output = writer.write_complete(&written).await.unwrap();

        assert_eq!(
            file_names(temp_dir.path()),
            vec!["doc_chunk1.wav", "doc_chunk2.wav", "doc_complete.wav"]
        );
        let chunk_samples: u32 = written
            .files
            .iter()
            .map(|f| wav_sample_count(f).unwrap())
            .sum();

        assert_eq!(remove_chunk_files(&written.files), 2);
        assert_eq!(file_names(temp_dir.path()), vec!["doc_complete.wav"]);
        assert_eq!(wav_sample_count(&output.path).unwrap(), chunk_samples);
        assert_eq!(output.sample_count, 600);
        assert_eq!(output.chunk_count, 2);
    }

    #[tokio::test]
    async fn test_write_all_leaves_only_complete_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(2, 50);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            temp_dir.path().join("nested"),
            "doc".to_string(),
        );
        let mut progress = ProgressTracker::new(|_| {});

        let output = writer
            .write_all(&chunks(&["One.", "Two."]), &mut progress)
            .await
            .unwrap();

        assert_eq!(file_names(&temp_dir.path().join("nested")), vec!["doc_complete.wav"]);
        assert_eq!(wav_sample_count(&output.path).unwrap(), 200);
    }

    #[tokio::test]
    async fn test_failure_on_second_chunk_keeps_first() {
        let temp_dir = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(1, 10).failing_on(2);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            temp_dir.path().to_path_buf(),
            "doc".to_string(),
        );
        let mut progress = ProgressTracker::new(|_| {});

        let err = writer
            .write_all(&chunks(&["One.", "Two."]), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Synthesis { chunk: 2, .. }));
        assert!(err.to_string().contains("engine exploded"));
        assert!(temp_dir.path().join("doc_chunk1.wav").exists());
        assert!(!temp_dir.path().join("doc_chunk2.wav").exists());
        assert!(!temp_dir.path().join("doc_complete.wav").exists());
    }

    #[tokio::test]
    async fn test_no_chunks_reports_no_audio_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("never");
        let backend = ScriptedBackend::new(1, 10);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            output_dir.clone(),
            "doc".to_string(),
        );
        let mut progress = ProgressTracker::new(|_| {});

        let err = writer.write_all(&[], &mut progress).await.unwrap_err();

        assert!(matches!(err, JobError::NoAudio));
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_silent_engine_reports_no_audio() {
        let temp_dir = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(0, 10);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            temp_dir.path().to_path_buf(),
            "doc".to_string(),
        );
        let mut seen = Vec::new();
        let mut progress = ProgressTracker::new(|p| seen.push(p));

        let err = writer
            .write_all(&chunks(&["One.", "Two."]), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::NoAudio));
        assert!(file_names(temp_dir.path()).is_empty());
        assert_eq!(seen, vec![50.0, 100.0]);
    }

    #[tokio::test]
    async fn test_progress_monotonic_and_completes_last() {
        let temp_dir = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(3, 10);
        let writer = ChunkWriter::new(
            &backend,
            SynthesisOptions::default(),
            temp_dir.path().to_path_buf(),
            "doc".to_string(),
        );
        let mut seen = Vec::new();
        let mut progress = ProgressTracker::new(|p| seen.push(p));

        writer
            .write_all(&chunks(&["One.", "Two.", "Three."]), &mut progress)
            .await
            .unwrap();

        assert_eq!(seen.len(), 9);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100.0);
        assert!(seen[..8].iter().all(|p| *p < 100.0));
    }
}
