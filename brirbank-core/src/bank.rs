use crate::dsp::peak;
use crate::math::ORIENTATION_COUNT;

/// Rows of a bank: left and right ear for every orientation.
pub const BANK_ROWS: usize = ORIENTATION_COUNT * 2;

/// Dense table of binaural room impulse responses, one stereo pair per degree.
///
/// Row `2k` holds the left ear and row `2k + 1` the right ear for a listener
/// facing `k` degrees. Samples are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct BrirBank {
    samples: Vec<f32>,
    columns: usize,
}

impl BrirBank {
    /// Zero-filled bank with `columns` samples per row.
    pub fn zeroed(columns: usize) -> Self {
        Self {
            samples: vec![0.0; BANK_ROWS * columns],
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        BANK_ROWS
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.samples[index * self.columns..(index + 1) * self.columns]
    }

    /// Left-ear response for orientation `degrees`.
    pub fn left(&self, degrees: usize) -> &[f32] {
        self.row(2 * degrees)
    }

    /// Right-ear response for orientation `degrees`.
    pub fn right(&self, degrees: usize) -> &[f32] {
        self.row(2 * degrees + 1)
    }

    /// Largest absolute sample over the whole bank.
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Frame `column` across all rows, in row order.
    pub fn frame(&self, column: usize) -> impl Iterator<Item = f32> + '_ {
        (0..BANK_ROWS).map(move |row| self.samples[row * self.columns + column])
    }
}
