use crate::audio_data::AudioSignal;
use crate::dsp::{add_scaled, full_convolution_len};
use crate::error::{BrirBankError, Result};
use crate::hrtf::HrtfSet;
use std::f32::consts::FRAC_PI_2;

/// Parametric room response of the spatial decomposition method (SDM):
/// pressure over time plus the direction of arrival of every sample.
#[derive(Debug, Clone)]
pub struct SpatialRoomDescription {
    pressure: Vec<f32>,
    /// Radians
    azimuth: Vec<f32>,
    /// Radians
    colatitude: Vec<f32>,
}

impl SpatialRoomDescription {
    /// All three sequences must have the same length.
    pub fn new(pressure: Vec<f32>, azimuth: Vec<f32>, colatitude: Vec<f32>) -> Result<Self> {
        if pressure.len() != azimuth.len() || pressure.len() != colatitude.len() {
            return Err(BrirBankError::AudioFormat(format!(
                "SDM tracks differ in length: pressure {}, azimuth {}, colatitude {}",
                pressure.len(),
                azimuth.len(),
                colatitude.len()
            )));
        }
        Ok(Self {
            pressure,
            azimuth,
            colatitude,
        })
    }

    /// Reads a three channel signal laid out as `[pressure, azimuth, colatitude]`.
    pub fn from_audio(signal: &AudioSignal) -> Result<Self> {
        if signal.channels() != 3 {
            return Err(BrirBankError::AudioFormat(format!(
                "SDM signal needs 3 channels (pressure, azimuth, colatitude), found {}",
                signal.channels()
            )));
        }
        Self::new(
            signal.channel(0)?.to_vec(),
            signal.channel(1)?.to_vec(),
            signal.channel(2)?.to_vec(),
        )
    }

    /// Replaces undefined directions: NaN azimuths become 0, NaN colatitudes π/2
    /// (frontal, horizontal).
    pub fn sanitize_nan(mut self) -> Self {
        let mut replaced = 0usize;
        for azi in self.azimuth.iter_mut().filter(|a| a.is_nan()) {
            *azi = 0.0;
            replaced += 1;
        }
        for colat in self.colatitude.iter_mut().filter(|c| c.is_nan()) {
            *colat = FRAC_PI_2;
            replaced += 1;
        }
        if replaced > 0 {
            log::debug!("Replaced {} undefined SDM directions", replaced);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    pub fn pressure(&self) -> &[f32] {
        &self.pressure
    }

    pub fn azimuth(&self) -> &[f32] {
        &self.azimuth
    }

    pub fn colatitude(&self) -> &[f32] {
        &self.colatitude
    }

    /// Azimuth track for a listener turned by `degrees`: every arrival moves by `-degrees`.
    pub fn rotated_azimuth(&self, degrees: usize) -> Vec<f32> {
        let angle = (degrees as f32).to_radians();
        self.azimuth.iter().map(|phi| phi - angle).collect()
    }
}

/// SDM binaural rendering: every pressure sample is placed at its own time offset
/// through the HRIR pair nearest to its direction of arrival.
///
/// Returns `(left, right)`, each `pressure.len() + hrtf.ir_len() - 1` samples long.
pub fn render_binaural_from_room(
    pressure: &[f32],
    azimuth: &[f32],
    colatitude: &[f32],
    hrtf: &HrtfSet,
) -> Result<(Vec<f32>, Vec<f32>)> {
    if pressure.len() != azimuth.len() || pressure.len() != colatitude.len() {
        return Err(BrirBankError::Render(format!(
            "SDM tracks differ in length: pressure {}, azimuth {}, colatitude {}",
            pressure.len(),
            azimuth.len(),
            colatitude.len()
        )));
    }

    let ir_len = hrtf.ir_len();
    let out_len = full_convolution_len(pressure.len(), ir_len);
    let mut left = vec![0.0f32; out_len];
    let mut right = vec![0.0f32; out_len];

    for (n, ((&p, &phi), &theta)) in pressure.iter().zip(azimuth).zip(colatitude).enumerate() {
        if p == 0.0 {
            continue;
        }
        let (h_left, h_right) = hrtf.nearest_pair(phi, theta);
        add_scaled(h_left, p, &mut left[n..n + ir_len]);
        add_scaled(h_right, p, &mut right[n..n + ir_len]);
    }

    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hrtf::{regular_grid, GridPosition};

    fn lateral_set() -> HrtfSet {
        // 0° -> left ear only, 180° -> right ear only
        let grid = vec![
            GridPosition::from_degrees(0.0, 90.0),
            GridPosition::from_degrees(180.0, 90.0),
        ];
        let left = vec![vec![1.0, 0.5], vec![0.0, 0.0]];
        let right = vec![vec![0.0, 0.0], vec![1.0, 0.5]];
        HrtfSet::new(left, right, grid, 44100).unwrap()
    }

    #[test]
    fn test_tracks_must_match() {
        assert!(SpatialRoomDescription::new(vec![0.0; 3], vec![0.0; 3], vec![0.0; 2]).is_err());
        let hrtf = lateral_set();
        assert!(render_binaural_from_room(&[0.0; 2], &[0.0; 1], &[0.0; 2], &hrtf).is_err());
    }

    #[test]
    fn test_sanitize_nan() {
        let room = SpatialRoomDescription::new(
            vec![1.0, 1.0],
            vec![f32::NAN, 0.3],
            vec![0.2, f32::NAN],
        )
        .unwrap()
        .sanitize_nan();
        assert_eq!(room.azimuth(), &[0.0, 0.3]);
        assert_eq!(room.colatitude(), &[0.2, FRAC_PI_2]);
    }

    #[test]
    fn test_rotated_azimuth_subtracts_degrees() {
        let room = SpatialRoomDescription::new(vec![1.0], vec![1.0], vec![FRAC_PI_2]).unwrap();
        let rotated = room.rotated_azimuth(90);
        assert!((rotated[0] - (1.0 - FRAC_PI_2)).abs() < 1e-6);
        assert_eq!(room.rotated_azimuth(0), vec![1.0]);
    }

    #[test]
    fn test_arrivals_placed_at_their_time_offset() {
        let hrtf = lateral_set();
        let pressure = [1.0, 0.0, -2.0];
        let azimuth = [0.0, 0.0, std::f32::consts::PI];
        let colatitude = [FRAC_PI_2; 3];

        let (left, right) =
            render_binaural_from_room(&pressure, &azimuth, &colatitude, &hrtf).unwrap();

        assert_eq!(left, vec![1.0, 0.5, 0.0, 0.0]);
        assert_eq!(right, vec![0.0, 0.0, -2.0, -1.0]);
    }

    #[test]
    fn test_empty_room_yields_hrir_tail_length() {
        let hrtf = HrtfSet::identity(regular_grid(30, 30), 16, 48000).unwrap();
        let (left, right) = render_binaural_from_room(&[], &[], &[], &hrtf).unwrap();
        assert_eq!(left.len(), 15);
        assert_eq!(right.len(), 15);
    }
}
