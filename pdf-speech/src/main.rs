//! pdf-speech - Convert PDF files or clipboard text to speech

mod audio;
mod config;
mod job;
mod platform;
mod source;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{MAX_SPEED, MIN_SPEED, PdfSpeechConfig};
use indicatif::{ProgressBar, ProgressStyle};
use job::{Job, JobInput, JobRunner, JobSettings};
use log::warn;
use source::InputError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pdf-speech")]
#[command(about = "Convert PDF files or clipboard text to speech using Kokoro TTS", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the PDF file
    pdf_file: Option<PathBuf>,

    /// Read the text from the clipboard instead of a PDF
    #[arg(long, conflicts_with = "pdf_file")]
    clipboard: bool,

    /// Directory for the generated audio (default: Downloads)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Kokoro voice (default: af_heart)
    #[arg(long)]
    voice: Option<String>,

    /// Speech speed multiplier (default: 1.0)
    #[arg(long)]
    speed: Option<f32>,

    /// Maximum characters per synthesis request (default: 4095)
    #[arg(long)]
    char_limit: Option<usize>,

    /// Don't open the output directory when done
    #[arg(long)]
    no_open: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Kokoro voice identifier (e.g. af_heart)
        voice: String,
    },
    /// Set default speed
    SetSpeed {
        /// Multiplier (0.25-4.0)
        value: f32,
    },
    /// Set maximum characters per synthesis request
    SetCharLimit {
        /// Characters (at least 1)
        value: usize,
    },
    /// Set default output directory
    SetOutputDir {
        /// Directory for generated audio
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let mut config = PdfSpeechConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // Input problems surface before anything is loaded
    let input = resolve_input(&args)?;
    let settings = JobSettings::from_config(&config);

    if args.debug {
        eprintln!("Input: {:?}", input);
        eprintln!("Output dir: {}", settings.output_dir.display());
        eprintln!("Voice: {}", settings.synthesis.voice);
        eprintln!("Speed: {}", settings.synthesis.speed);
        eprintln!("Char limit: {}", settings.char_limit);
    }

    eprintln!("Loading speech engine...");
    let backend = tts::create_backend(&config).context("Failed to start speech engine")?;
    let runner = JobRunner::new(Arc::from(backend));

    let output_dir = settings.output_dir.clone();
    let handle = runner.submit(Job::new(input, settings))?;

    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    pb.set_message("Progress: 0%");

    let result = handle
        .wait(|percent| {
            pb.set_position((percent * 10.0).round() as u64);
            pb.set_message(format!("Progress: {:.1}%", percent));
        })
        .await;

    let outcome = match result {
        Ok(output) => {
            pb.finish_with_message("Progress: 100%");
            eprintln!(
                "Audio saved to:\n{} ({} chunk(s), {:.1}s)",
                output.path.display(),
                output.chunk_count,
                output.sample_count as f64 / audio::SAMPLE_RATE as f64
            );
            if config.reveal_output {
                if let Err(e) = platform::reveal_directory(&output_dir) {
                    warn!("{}", e);
                }
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            Err(anyhow::Error::new(e))
        }
    };

    runner.acknowledge();
    outcome
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Apply one-off command-line overrides on top of the saved configuration.
fn apply_overrides(config: &mut PdfSpeechConfig, args: &Args) {
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(voice) = &args.voice {
        config.voice = voice.clone();
    }
    if let Some(speed) = args.speed {
        config.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }
    if let Some(limit) = args.char_limit {
        config.char_limit = limit;
    }
    if args.no_open {
        config.reveal_output = false;
    }
}

/// Turn the command line into a job input, rejecting it before a job starts.
fn resolve_input(args: &Args) -> Result<JobInput, InputError> {
    if args.clipboard {
        return Ok(JobInput::Text(source::read_clipboard()?));
    }

    match &args.pdf_file {
        Some(path) => Ok(JobInput::Pdf(source::validate_pdf_path(path)?)),
        None => Err(InputError::NoSource),
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = PdfSpeechConfig::load()?;
            println!("Configuration file: {:?}", PdfSpeechConfig::config_path()?);
            println!();
            println!("char_limit = {}", config.char_limit);
            println!("voice = \"{}\"", config.voice);
            println!("speed = {}", config.speed);
            println!("lang_code = \"{}\"", config.lang_code);
            match &config.output_dir {
                Some(dir) => println!("output_dir = \"{}\"", dir.display()),
                None => println!(
                    "output_dir = (default: {})",
                    config::default_output_dir().display()
                ),
            }
            println!("reveal_output = {}", config.reveal_output);
            if let Some(site_packages) = &config.python_site_packages {
                println!("python_site_packages = \"{}\"", site_packages.display());
            }
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = PdfSpeechConfig::load()?;
            config.voice = voice.clone();
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetSpeed { value } => {
            let mut config = PdfSpeechConfig::load()?;
            config.speed = value.clamp(MIN_SPEED, MAX_SPEED);
            config.save()?;
            println!("Default speed set to: {}", config.speed);
        }
        ConfigAction::SetCharLimit { value } => {
            let mut config = PdfSpeechConfig::load()?;
            config.char_limit = *value;
            config.save()?;
            println!("Character limit set to: {}", config.char_limit);
        }
        ConfigAction::SetOutputDir { path } => {
            let mut config = PdfSpeechConfig::load()?;
            config.output_dir = Some(path.clone());
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_pdf() {
        let args = Args::try_parse_from(["pdf-speech", "book.pdf", "--speed", "1.5"]).unwrap();
        assert_eq!(args.pdf_file, Some(PathBuf::from("book.pdf")));
        assert_eq!(args.speed, Some(1.5));
        assert!(!args.clipboard);
    }

    #[test]
    fn test_clipboard_conflicts_with_pdf() {
        assert!(Args::try_parse_from(["pdf-speech", "book.pdf", "--clipboard"]).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args::try_parse_from([
            "pdf-speech",
            "book.pdf",
            "--voice",
            "bm_george",
            "--char-limit",
            "500",
            "--output-dir",
            "/tmp/speech",
            "--no-open",
        ])
        .unwrap();
        let mut config = PdfSpeechConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.voice, "bm_george");
        assert_eq!(config.char_limit, 500);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/speech")));
        assert!(!config.reveal_output);
        assert_eq!(config.speed, 1.0);
    }

    #[test]
    fn test_speed_override_is_clamped() {
        let mut config = PdfSpeechConfig::default();

        let args = Args::try_parse_from(["pdf-speech", "book.pdf", "--speed", "50"]).unwrap();
        apply_overrides(&mut config, &args);
        assert_eq!(config.speed, MAX_SPEED);

        let args = Args::try_parse_from(["pdf-speech", "book.pdf", "--speed", "0.01"]).unwrap();
        apply_overrides(&mut config, &args);
        assert_eq!(config.speed, MIN_SPEED);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_source_is_input_error() {
        let args = Args::try_parse_from(["pdf-speech"]).unwrap();
        assert!(matches!(resolve_input(&args), Err(InputError::NoSource)));
    }

    #[test]
    fn test_non_pdf_is_input_error() {
        let args = Args::try_parse_from(["pdf-speech", "notes.txt"]).unwrap();
        assert!(matches!(resolve_input(&args), Err(InputError::NotPdf(_))));
    }
}
