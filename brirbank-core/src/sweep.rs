//! Orientation sweep: one binaural render per integer degree, assembled into a bank.

use crate::bank::BrirBank;
use crate::error::{BrirBankError, Result};
use crate::hrtf::HrtfSet;
use crate::math::ORIENTATION_COUNT;
use crate::source::SpatialSource;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

/// Execution options of [`synthesize`].
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Dedicated pool size; None runs on rayon's global pool
    pub worker_threads: Option<NonZeroUsize>,
    /// Raised by the caller to stop the sweep between orientations
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SweepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn worker_threads(mut self, threads: NonZeroUsize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Fails with `SampleRateMismatch` if the HRTF set or the source run at another
/// rate than `sample_rate`.
pub fn check_sample_rates(source: &SpatialSource, hrtf: &HrtfSet, sample_rate: u32) -> Result<()> {
    if hrtf.sample_rate() != sample_rate {
        return Err(BrirBankError::SampleRateMismatch {
            expected: sample_rate,
            found: hrtf.sample_rate(),
        });
    }
    if let Some(source_rate) = source.sample_rate().filter(|&rate| rate != sample_rate) {
        return Err(BrirBankError::SampleRateMismatch {
            expected: sample_rate,
            found: source_rate,
        });
    }
    Ok(())
}

/// Renders `source` for all 360 listener orientations.
///
/// Every orientation owns two disjoint rows of the bank, so orientations are
/// rendered in parallel without locking. Fails before rendering anything if the
/// HRTF set or the source disagree with `sample_rate`.
pub fn synthesize(
    source: &SpatialSource,
    hrtf: &HrtfSet,
    sample_rate: u32,
    options: &SweepOptions,
) -> Result<BrirBank> {
    check_sample_rates(source, hrtf, sample_rate)?;

    let columns = source.output_len(hrtf);
    let mut bank = BrirBank::zeroed(columns);

    log::info!(
        "Synthesizing {} orientations, {} samples per ear",
        ORIENTATION_COUNT,
        columns
    );
    let started = Instant::now();

    if columns == 0 {
        log::debug!("Empty source with single-sample HRIRs, nothing to render");
        return Ok(bank);
    }

    let completed = AtomicUsize::new(0);
    let render_all = |samples: &mut [f32]| -> Result<()> {
        samples
            .par_chunks_mut(2 * columns)
            .enumerate()
            .try_for_each(|(degrees, rows)| {
                if options.is_cancelled() {
                    return Err(BrirBankError::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                    });
                }

                let (left, right) = source.render_orientation(degrees, hrtf)?;
                if left.len() != columns || right.len() != columns {
                    return Err(BrirBankError::Render(format!(
                        "Orientation {}: renderer returned {}/{} samples, expected {}",
                        degrees,
                        left.len(),
                        right.len(),
                        columns
                    )));
                }

                let (left_row, right_row) = rows.split_at_mut(columns);
                left_row.copy_from_slice(&left);
                right_row.copy_from_slice(&right);
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
    };

    match options.worker_threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.get())
                .thread_name(|i| format!("brirbank-sweep-{}", i))
                .build()
                .map_err(|e| {
                    BrirBankError::Configuration(format!("Failed to build worker pool: {}", e))
                })?;
            pool.install(|| render_all(bank.as_mut_slice()))?;
        }
        None => render_all(bank.as_mut_slice())?,
    }

    log::info!(
        "Sweep finished in {:.2?} ({} orientations)",
        started.elapsed(),
        completed.load(Ordering::Relaxed)
    );

    Ok(bank)
}
