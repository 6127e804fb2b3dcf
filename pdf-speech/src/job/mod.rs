//! Text-to-speech jobs: one source in, one combined WAV out.
//!
//! A job resolves its source to text, chunks it, then hands the chunks to the
//! writer. Jobs are submitted through the single-slot [`JobRunner`].

pub mod runner;
pub mod writer;

pub use runner::JobRunner;
pub use writer::{ChunkWriter, ProgressTracker};

use crate::config::PdfSpeechConfig;
use crate::source::{ExtractionError, InputError, SourceText, extract_pdf_text};
use crate::text::prepare_chunks;
use crate::tts::{SynthesisOptions, TtsBackend};
use log::info;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a job. None of them are retried.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("A job is already running")]
    Busy,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("No content to synthesize")]
    NoContent,

    #[error("Speech synthesis failed on chunk {chunk}: {message}")]
    Synthesis { chunk: usize, message: String },

    #[error("No audio segments generated")]
    NoAudio,

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write audio: {0}")]
    Write(String),

    #[error("Job ended without a result: {0}")]
    Aborted(String),
}

/// What a job reads its text from.
#[derive(Debug, Clone)]
pub enum JobInput {
    /// A validated PDF path; text is extracted on the worker.
    Pdf(PathBuf),
    /// Text acquired up front (clipboard).
    Text(SourceText),
}

/// Per-job settings, fixed when the job is created.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    /// Maximum characters per chunk
    pub char_limit: usize,
    pub synthesis: SynthesisOptions,
    pub output_dir: PathBuf,
}

impl JobSettings {
    pub fn from_config(config: &PdfSpeechConfig) -> Self {
        Self {
            char_limit: config.char_limit,
            synthesis: SynthesisOptions::new()
                .with_voice(config.voice.clone())
                .with_speed(config.speed),
            output_dir: config.resolved_output_dir(),
        }
    }
}

/// One end-to-end conversion request.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: JobInput,
    pub settings: JobSettings,
}

impl Job {
    pub fn new(input: JobInput, settings: JobSettings) -> Self {
        Self { input, settings }
    }
}

/// Result of a successful job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutput {
    /// Path of the combined `{base}_complete.wav`
    pub path: PathBuf,
    /// Number of chunks synthesized
    pub chunk_count: usize,
    /// Total samples in the combined file
    pub sample_count: usize,
}

/// Run a job to completion, reporting progress percentages to `on_progress`.
pub async fn run_job<F>(backend: &dyn TtsBackend, job: &Job, on_progress: F) -> Result<JobOutput, JobError>
where
    F: FnMut(f64) + Send,
{
    let source = match &job.input {
        JobInput::Pdf(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || extract_pdf_text(&path))
                .await
                .map_err(|e| JobError::Aborted(format!("PDF extraction task failed: {}", e)))??
        }
        JobInput::Text(source) => source.clone(),
    };

    let chunks = prepare_chunks(source.text(), job.settings.char_limit);
    info!(
        "Processed {} characters split into {} chunk(s).",
        source.text().chars().count(),
        chunks.len()
    );

    if chunks.is_empty() {
        return Err(JobError::NoContent);
    }

    let writer = ChunkWriter::new(
        backend,
        job.settings.synthesis.clone(),
        job.settings.output_dir.clone(),
        source.base_name(),
    );

    let mut progress = ProgressTracker::new(on_progress);
    writer.write_all(&chunks, &mut progress).await
}
