//! # brirbank core
//!
//! Offline synthesis of head-tracking BRIR banks: a binaural room impulse
//! response for every integer listener azimuth from 0° to 359°, written as one
//! 720 channel WAV file (`[L0, R0, L1, R1, ..., L359, R359]`) for a head-tracked
//! binaural renderer.
//!
//! The input is either a loudspeaker array (impulse responses plus the [`Hull`]
//! that renders them) or a parametric room description (pressure and direction
//! of arrival per sample).
//!
//! ## Quick Start
//!
//! ```no_run
//! use brirbank_core::*;
//! use std::sync::Arc;
//!
//! let desc = BrirBankDesc::default().sample_rate(48000);
//! let mut pipeline = BrirPipeline::new(desc)?;
//!
//! // One channel per loudspeaker
//! let irs = audio_data::AudioSignal::from_path("array_irs.wav")?;
//! let signals = LoudspeakerSignals::from_audio(&irs);
//! let layout = LoudspeakerLayout::horizontal_ring(signals.loudspeakers());
//!
//! // HRTF set resolved from the desc (default set for 48 kHz)
//! let path = pipeline.write_loudspeaker_brirs("array_brirs", signals, Arc::new(layout), None)?;
//!
//! for event in pipeline.poll_events() {
//!     if event.is_advisory() {
//!         println!("{:?}", event);
//!     }
//! }
//! println!("wrote {}", path.display());
//! # Ok::<(), BrirBankError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`BrirPipeline`]**: provider, sweep, normalizer and serializer in one run
//! - **[`HrtfSet`]**: immutable left/right HRIRs on a spatial grid
//! - **[`SpatialSource`]**: array or room input, rotated per orientation
//! - **[`synthesize`]**: the parallel orientation sweep
//! - **[`BrirEvent`]**: progress and advisories collected by the pipeline

pub mod audio_data;
pub mod bank;
pub mod config;
pub mod dsp;
pub mod error;
pub mod events;
pub mod hrtf;
pub mod math;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod sweep;
pub mod writer;

pub use bank::{BrirBank, BANK_ROWS};
pub use config::BrirBankDesc;
pub use error::{BrirBankError, Result};
pub use events::BrirEvent;
pub use hrtf::{GridPosition, HrtfProvider, HrtfSet};
pub use math::{Orientation, Quat, Vec3, ORIENTATION_COUNT};
pub use normalize::normalize;
pub use pipeline::BrirPipeline;
pub use source::{
    Hull, LoudspeakerLayout, LoudspeakerSignals, RotatedSource, SpatialRoomDescription,
    SpatialSource,
};
pub use sweep::{synthesize, SweepOptions};
pub use writer::write_bank;
