//! Error types for brirbank

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrirBankError {
    #[error("No default HRTF set for sample rate {sample_rate} Hz (supported: 44100, 48000)")]
    UnsupportedSampleRate { sample_rate: u32 },

    #[error(
        "No default HRTF data for {sample_rate} Hz at {}; run `brirbank generate-hrtf`",
        path.display()
    )]
    MissingDefaultData { sample_rate: u32, path: PathBuf },

    #[error("Sample rate mismatch: expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("IO failure: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("HRTF format error: {0}")]
    HrtfFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Sweep cancelled after {completed} orientations")]
    Cancelled { completed: usize },
}

impl From<hound::Error> for BrirBankError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => BrirBankError::IoFailure(e),
            other => BrirBankError::IoFailure(std::io::Error::new(
                std::io::ErrorKind::Other,
                other,
            )),
        }
    }
}

pub type Result<T> = std::result::Result<T, BrirBankError>;
