//! Kokoro TTS backend using PyO3 to embed Python.
//!
//! Drives `kokoro.KPipeline`, which splits each chunk on the given pattern and
//! yields one `(graphemes, phonemes, audio)` result per sub-segment at 24 kHz.

use super::{SynthesisOptions, SynthesizedSegment, TtsBackend};
use crate::audio::AudioSegment;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

/// Initialize Python runtime once.
static PYTHON_INIT: Once = Once::new();

/// Kokoro TTS backend using PyO3.
pub struct KokoroBackend {
    /// Loaded `KPipeline` instance, shared with blocking tasks
    pipeline: Arc<Py<PyAny>>,
    /// Kokoro language code ("a" = American English)
    lang_code: String,
}

impl KokoroBackend {
    /// Load the Kokoro pipeline.
    ///
    /// # Arguments
    /// * `lang_code` - Kokoro language code, "a" for American English
    /// * `site_packages` - Optional directory prepended to `sys.path`, for a venv
    pub fn new(lang_code: &str, site_packages: Option<PathBuf>) -> Result<Self> {
        PYTHON_INIT.call_once(pyo3::prepare_freethreaded_python);

        if let Some(site_packages) = usable_site_packages(site_packages.as_deref()) {
            let entry = site_packages.to_string_lossy().into_owned();
            let added = Python::with_gil(|py| -> PyResult<bool> {
                let path = py.import("sys")?.getattr("path")?;
                if path.contains(entry.as_str())? {
                    return Ok(false);
                }
                path.call_method1("insert", (0, entry.as_str()))?;
                Ok(true)
            });
            match added {
                Ok(true) => debug!("Added {} to sys.path", entry),
                Ok(false) => {}
                Err(e) => warn!("Could not add {} to sys.path: {}", entry, e),
            }
        }

        info!("Loading Kokoro pipeline (lang_code={})", lang_code);
        let pipeline = Python::with_gil(|py| -> Result<Py<PyAny>> {
            let kokoro = py
                .import("kokoro")
                .context("Failed to import kokoro. Install it with `pip install kokoro`.")?;
            let kwargs = PyDict::new(py);
            kwargs.set_item("lang_code", lang_code)?;
            let pipeline = kokoro.getattr("KPipeline")?.call((), Some(&kwargs))?;
            Ok(pipeline.unbind())
        })?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            lang_code: lang_code.to_string(),
        })
    }

    /// Run the pipeline over one chunk and collect every result.
    fn synthesize_sync(
        pipeline: &Py<PyAny>,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Vec<SynthesizedSegment>> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("voice", &options.voice)?;
            kwargs.set_item("speed", options.speed)?;
            kwargs.set_item("split_pattern", &options.split_pattern)?;

            let results = pipeline.bind(py).call((text,), Some(&kwargs))?;

            let mut segments = Vec::new();
            for result in results.try_iter()? {
                let result = result?;
                let graphemes: String = result.getattr("graphemes")?.extract()?;
                let phonemes: String = result.getattr("phonemes")?.extract()?;

                let audio = result.getattr("audio")?;
                if audio.is_none() {
                    debug!("No audio for segment {:?}", graphemes);
                    continue;
                }

                // torch tensor -> list[float]
                let samples: Vec<f32> = audio
                    .call_method0("cpu")?
                    .call_method0("numpy")?
                    .call_method0("tolist")?
                    .extract()?;

                segments.push(SynthesizedSegment {
                    graphemes,
                    phonemes,
                    audio: AudioSegment::new(samples),
                });
            }

            Ok(segments)
        })
    }
}

/// The configured site-packages directory, if it exists.
fn usable_site_packages(site_packages: Option<&Path>) -> Option<&Path> {
    let site_packages = site_packages?;
    if site_packages.is_dir() {
        Some(site_packages)
    } else {
        warn!(
            "python_site_packages {} does not exist; using the default Python path",
            site_packages.display()
        );
        None
    }
}

#[async_trait]
impl TtsBackend for KokoroBackend {
    async fn synthesize(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Vec<SynthesizedSegment>> {
        debug!("Kokoro[{}]: {} chars", self.lang_code, text.chars().count());
        let text = text.to_string();
        let options = options.clone();
        let pipeline = Arc::clone(&self.pipeline);

        // Run in a blocking task to not block the tokio runtime
        tokio::task::spawn_blocking(move || Self::synthesize_sync(&pipeline, &text, &options))
            .await
            .context("Task join error")?
    }

    fn name(&self) -> &str {
        "kokoro"
    }
}
