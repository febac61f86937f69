//! Spatial source representations consumed by the orientation sweep.
//!
//! A [`SpatialSource`] is either a loudspeaker array rendered through a [`Hull`]
//! or a parametric room description. Both expose the same two steps: `rotate` to
//! one listener orientation, then `render` against an HRTF set.

mod hull;
mod room;

pub use hull::{Hull, LoudspeakerLayout, LoudspeakerSignals};
pub use room::{render_binaural_from_room, SpatialRoomDescription};

use crate::dsp::full_convolution_len;
use crate::error::Result;
use crate::hrtf::HrtfSet;
use crate::math::Orientation;
use std::sync::Arc;

/// Loudspeaker-array impulse responses paired with the hull that renders them.
#[derive(Clone)]
pub struct ArraySource {
    signals: LoudspeakerSignals,
    hull: Arc<dyn Hull>,
    sample_rate: u32,
}

impl ArraySource {
    pub fn new(signals: LoudspeakerSignals, hull: Arc<dyn Hull>, sample_rate: u32) -> Self {
        Self {
            signals,
            hull,
            sample_rate,
        }
    }

    pub fn signals(&self) -> &LoudspeakerSignals {
        &self.signals
    }

    pub fn hull(&self) -> &dyn Hull {
        self.hull.as_ref()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl std::fmt::Debug for ArraySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArraySource")
            .field("loudspeakers", &self.signals.loudspeakers())
            .field("len", &self.signals.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Input of one bank synthesis.
#[derive(Debug, Clone)]
pub enum SpatialSource {
    /// Loudspeaker-array impulse responses, rotated and rendered by the hull
    Array(ArraySource),
    /// Pressure and direction of arrival over time, rotated locally
    Room(SpatialRoomDescription),
}

impl SpatialSource {
    pub fn array(signals: LoudspeakerSignals, hull: Arc<dyn Hull>, sample_rate: u32) -> Self {
        Self::Array(ArraySource::new(signals, hull, sample_rate))
    }

    pub fn room(room: SpatialRoomDescription) -> Self {
        Self::Room(room)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_room(&self) -> bool {
        matches!(self, Self::Room(_))
    }

    /// Declared sample rate of the source, if it carries one.
    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            Self::Array(array) => Some(array.sample_rate),
            Self::Room(_) => None,
        }
    }

    /// Samples per loudspeaker (array) or per track (room).
    pub fn source_len(&self) -> usize {
        match self {
            Self::Array(array) => array.signals.len(),
            Self::Room(room) => room.len(),
        }
    }

    /// Samples per ear of every rendered orientation.
    pub fn output_len(&self, hrtf: &HrtfSet) -> usize {
        full_convolution_len(self.source_len(), hrtf.ir_len())
    }

    /// Source as heard by a listener turned `degrees` about the vertical axis.
    pub fn rotate(&self, degrees: usize) -> RotatedSource<'_> {
        match self {
            Self::Array(array) => RotatedSource::Array {
                source: array,
                orientation: Orientation::from_degrees(degrees),
            },
            Self::Room(room) => RotatedSource::Room {
                pressure: room.pressure(),
                azimuth: room.rotated_azimuth(degrees),
                colatitude: room.colatitude(),
            },
        }
    }

    /// Single-orientation render, `(left, right)`.
    pub fn render_orientation(
        &self,
        degrees: usize,
        hrtf: &HrtfSet,
    ) -> Result<(Vec<f32>, Vec<f32>)> {
        self.rotate(degrees).render(hrtf)
    }
}

/// Renderer-ready source for exactly one orientation.
#[derive(Debug)]
pub enum RotatedSource<'a> {
    Array {
        source: &'a ArraySource,
        orientation: Orientation,
    },
    Room {
        pressure: &'a [f32],
        azimuth: Vec<f32>,
        colatitude: &'a [f32],
    },
}

impl RotatedSource<'_> {
    pub fn render(&self, hrtf: &HrtfSet) -> Result<(Vec<f32>, Vec<f32>)> {
        match self {
            Self::Array {
                source,
                orientation,
            } => source
                .hull
                .binauralize(&source.signals, source.sample_rate, *orientation, hrtf),
            Self::Room {
                pressure,
                azimuth,
                colatitude,
            } => render_binaural_from_room(pressure, azimuth, colatitude, hrtf),
        }
    }
}
