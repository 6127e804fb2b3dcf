//! Revealing the output directory in the platform's file browser.

use log::debug;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevealError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },
}

/// Operating system families with distinct "open folder" commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Windows,
    /// Linux and other freedesktop systems.
    Unix,
}

impl Os {
    /// Detect the current OS.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Os::MacOs
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Unix
        }
    }

    /// Command that opens a directory in the file browser.
    pub fn opener(&self) -> &'static str {
        match self {
            Os::MacOs => "open",
            Os::Windows => "explorer",
            Os::Unix => "xdg-open",
        }
    }

    /// Get the OS string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::MacOs => "macOS",
            Os::Windows => "Windows",
            Os::Unix => "Unix",
        }
    }
}

/// Open `dir` in the file browser without waiting for it.
pub fn reveal_directory(dir: &Path) -> Result<(), RevealError> {
    let os = Os::detect();
    let command = os.opener();
    debug!("Revealing {} with {} ({})", dir.display(), command, os.as_str());
    Command::new(command)
        .arg(dir)
        .spawn()
        .map_err(|source| RevealError::Spawn { command, source })?;
    Ok(())
}
