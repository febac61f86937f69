//! Configuration for a BRIR bank run

use crate::error::{BrirBankError, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Environment variable overriding the directory that holds the default HRTF sets.
pub const DATA_DIR_ENV: &str = "BRIRBANK_DATA_DIR";

/// Descriptor for one synthesis run.
#[derive(Debug, Clone)]
pub struct BrirBankDesc {
    /// Sample rate of the source signals, the HRTF set and the written bank
    pub sample_rate: u32,
    /// Optional HRTF container (None uses the default set for `sample_rate`)
    pub hrtf_path: Option<PathBuf>,
    /// Replace the HRTF responses by unit impulses (pipeline validation)
    pub dummy_hrtf: bool,
    /// Directory searched for the default HRTF sets
    pub data_dir: PathBuf,
    /// Worker threads for the orientation sweep (None = rayon's global pool)
    pub worker_threads: Option<NonZeroUsize>,
    /// Rescale the bank when it exceeds full scale
    pub normalize: bool,
}

impl Default for BrirBankDesc {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            hrtf_path: None,
            dummy_hrtf: false,
            data_dir: default_data_dir(),
            worker_threads: None,
            normalize: true,
        }
    }
}

impl BrirBankDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn hrtf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hrtf_path = Some(path.into());
        self
    }

    pub fn dummy_hrtf(mut self, dummy: bool) -> Self {
        self.dummy_hrtf = dummy;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn worker_threads(mut self, threads: NonZeroUsize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(BrirBankError::Configuration(
                "Sample rate must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}
