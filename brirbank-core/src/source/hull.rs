use crate::audio_data::AudioSignal;
use crate::dsp::{convolve_accumulate, full_convolution_len};
use crate::error::{BrirBankError, Result};
use crate::hrtf::HrtfSet;
use crate::math::{direction, Orientation, Vec3};

/// Impulse responses of a fixed loudspeaker layout, one row per loudspeaker.
#[derive(Debug, Clone)]
pub struct LoudspeakerSignals {
    /// Loudspeaker-major: row `l` occupies `l * len..(l + 1) * len`
    samples: Vec<f32>,
    loudspeakers: usize,
    len: usize,
}

impl LoudspeakerSignals {
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self> {
        let len = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().position(|r| r.len() != len) {
            return Err(BrirBankError::AudioFormat(format!(
                "Loudspeaker {} has {} samples, expected {}",
                row,
                rows[row].len(),
                len
            )));
        }
        Ok(Self {
            loudspeakers: rows.len(),
            len,
            samples: rows.concat(),
        })
    }

    /// One loudspeaker per channel of `signal`.
    pub fn from_audio(signal: &AudioSignal) -> Self {
        Self {
            samples: signal.channel_iter().flatten().copied().collect(),
            loudspeakers: signal.channels(),
            len: signal.frames(),
        }
    }

    pub fn loudspeakers(&self) -> usize {
        self.loudspeakers
    }

    /// Samples per loudspeaker.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn row(&self, loudspeaker: usize) -> &[f32] {
        &self.samples[loudspeaker * self.len..(loudspeaker + 1) * self.len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.loudspeakers).map(move |l| self.row(l))
    }
}

/// Geometric/decoding model of a loudspeaker array that can render its signals binaurally.
///
/// Implementations must be pure: the orientation sweep calls `binauralize` from
/// several worker threads at once.
pub trait Hull: Send + Sync {
    fn num_loudspeakers(&self) -> usize;

    /// Renders `signals` for a listener facing `orientation`.
    ///
    /// Returns `(left, right)`, each `signals.len() + hrtf.ir_len() - 1` samples long.
    fn binauralize(
        &self,
        signals: &LoudspeakerSignals,
        sample_rate: u32,
        orientation: Orientation,
        hrtf: &HrtfSet,
    ) -> Result<(Vec<f32>, Vec<f32>)>;
}

/// Virtual-loudspeaker hull: every loudspeaker is rendered through the HRIR pair
/// nearest to its direction as seen by the listener.
#[derive(Debug, Clone)]
pub struct LoudspeakerLayout {
    positions: Vec<(f32, f32)>,
    directions: Vec<Vec3>,
}

impl LoudspeakerLayout {
    /// Layout from `(azimuth, colatitude)` pairs in radians.
    pub fn new(positions: Vec<(f32, f32)>) -> Self {
        let directions = positions
            .iter()
            .map(|&(azimuth, colatitude)| direction(azimuth, colatitude))
            .collect();
        Self {
            positions,
            directions,
        }
    }

    /// Layout from `(azimuth, colatitude)` pairs in degrees.
    pub fn from_degrees(positions: &[(f32, f32)]) -> Self {
        Self::new(
            positions
                .iter()
                .map(|&(azi, colat)| (azi.to_radians(), colat.to_radians()))
                .collect(),
        )
    }

    /// `count` loudspeakers evenly spaced on the horizontal plane, the first at 0°.
    pub fn horizontal_ring(count: usize) -> Self {
        let step = 360.0 / count.max(1) as f32;
        let positions: Vec<(f32, f32)> = (0..count).map(|l| (l as f32 * step, 90.0)).collect();
        Self::from_degrees(&positions)
    }

    pub fn positions(&self) -> &[(f32, f32)] {
        &self.positions
    }
}

impl Hull for LoudspeakerLayout {
    fn num_loudspeakers(&self) -> usize {
        self.positions.len()
    }

    fn binauralize(
        &self,
        signals: &LoudspeakerSignals,
        sample_rate: u32,
        orientation: Orientation,
        hrtf: &HrtfSet,
    ) -> Result<(Vec<f32>, Vec<f32>)> {
        if hrtf.sample_rate() != sample_rate {
            return Err(BrirBankError::SampleRateMismatch {
                expected: sample_rate,
                found: hrtf.sample_rate(),
            });
        }
        if signals.loudspeakers() != self.num_loudspeakers() {
            return Err(BrirBankError::Render(format!(
                "{} loudspeaker signals for a layout of {} loudspeakers",
                signals.loudspeakers(),
                self.num_loudspeakers()
            )));
        }

        let out_len = full_convolution_len(signals.len(), hrtf.ir_len());
        let mut left = vec![0.0f32; out_len];
        let mut right = vec![0.0f32; out_len];

        for (signal, &world_dir) in signals.rows().zip(&self.directions) {
            let grid_index = hrtf.nearest_to(orientation.to_listener_frame(world_dir));
            convolve_accumulate(signal, hrtf.left(grid_index), &mut left);
            convolve_accumulate(signal, hrtf.right(grid_index), &mut right);
        }

        Ok((left, right))
    }
}
