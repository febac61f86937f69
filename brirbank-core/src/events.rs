//! Event types for brirbank

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum BrirEvent {
    HrtfLoaded {
        sample_rate: u32,
        grid_positions: usize,
        ir_len: usize,
        dummy: bool,
    },
    SweepStarted {
        orientations: usize,
        frames: usize,
    },
    SweepCompleted {
        orientations: usize,
        elapsed: Duration,
    },
    /// The bank exceeded full scale and was rescaled by `1 / peak`.
    ClippingCorrected {
        peak: f32,
    },
    BankWritten {
        path: PathBuf,
        channels: usize,
        frames: usize,
    },
}

impl BrirEvent {
    /// True for non-fatal conditions the caller should be told about.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Self::ClippingCorrected { .. })
    }
}
