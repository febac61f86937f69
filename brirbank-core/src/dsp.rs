//! Small offline DSP helpers shared by the renderers.

/// Length of the full linear convolution of `signal_len` and `impulse_len` samples.
///
/// `impulse_len` is at least 1 for every HRTF set, so an empty signal yields
/// `impulse_len - 1` samples.
pub fn full_convolution_len(signal_len: usize, impulse_len: usize) -> usize {
    (signal_len + impulse_len).saturating_sub(1)
}

/// Adds the full convolution of `signal` and `impulse` into `output`.
///
/// Complexity is `theta(M*N)`. Zero input samples are skipped, which makes sparse
/// (impulsive) room responses cheap.
///
/// # Panics
///
/// Panics if `output` is shorter than [`full_convolution_len`].
pub fn convolve_accumulate(signal: &[f32], impulse: &[f32], output: &mut [f32]) {
    assert!(output.len() >= full_convolution_len(signal.len(), impulse.len()));

    for (n, &x) in signal.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        add_scaled(impulse, x, &mut output[n..n + impulse.len()]);
    }
}

/// `output[i] += gain * impulse[i]`
pub fn add_scaled(impulse: &[f32], gain: f32, output: &mut [f32]) {
    debug_assert_eq!(impulse.len(), output.len());
    for (o, &h) in output.iter_mut().zip(impulse) {
        *o += gain * h;
    }
}

/// Largest absolute sample value, 0 for an empty slice.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}
