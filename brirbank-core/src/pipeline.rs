//! Batch pipeline: HRTF provider, orientation sweep, normalizer, serializer.

use crate::bank::BrirBank;
use crate::config::BrirBankDesc;
use crate::error::Result;
use crate::events::BrirEvent;
use crate::hrtf::{HrtfProvider, HrtfSet};
use crate::math::ORIENTATION_COUNT;
use crate::normalize::normalize;
use crate::source::{Hull, LoudspeakerSignals, SpatialRoomDescription, SpatialSource};
use crate::sweep::{check_sample_rates, synthesize, SweepOptions};
use crate::writer;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// One synthesis run configured by a [`BrirBankDesc`].
///
/// Methods taking an optional HRTF set fall back to the provider with the desc's
/// settings. Progress and advisories are collected as [`BrirEvent`]s and drained
/// with [`poll_events`](Self::poll_events).
pub struct BrirPipeline {
    desc: BrirBankDesc,
    cancel: Arc<AtomicBool>,
    events: Vec<BrirEvent>,
}

impl BrirPipeline {
    pub fn new(desc: BrirBankDesc) -> Result<Self> {
        desc.validate()?;
        Ok(Self {
            desc,
            cancel: Arc::new(AtomicBool::new(false)),
            events: Vec::new(),
        })
    }

    pub fn desc(&self) -> &BrirBankDesc {
        &self.desc
    }

    /// Flag that stops a running sweep between orientations when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Loads the HRTF set selected by the desc.
    pub fn load_hrtf(&mut self) -> Result<HrtfSet> {
        let hrtf = HrtfProvider::from_desc(&self.desc).load()?;
        self.events.push(BrirEvent::HrtfLoaded {
            sample_rate: hrtf.sample_rate(),
            grid_positions: hrtf.grid_len(),
            ir_len: hrtf.ir_len(),
            dummy: self.desc.dummy_hrtf,
        });
        Ok(hrtf)
    }

    /// Sweeps `source` over all orientations and normalizes the result if enabled.
    pub fn render_bank(
        &mut self,
        source: &SpatialSource,
        hrtf: Option<&HrtfSet>,
    ) -> Result<BrirBank> {
        let hrtf = match hrtf {
            Some(hrtf) => hrtf.clone(),
            None => self.load_hrtf()?,
        };

        check_sample_rates(source, &hrtf, self.desc.sample_rate)?;

        let options = SweepOptions {
            worker_threads: self.desc.worker_threads,
            cancel: Some(Arc::clone(&self.cancel)),
        };

        self.events.push(BrirEvent::SweepStarted {
            orientations: ORIENTATION_COUNT,
            frames: source.output_len(&hrtf),
        });
        let started = Instant::now();
        let mut bank = synthesize(source, &hrtf, self.desc.sample_rate, &options)?;
        self.events.push(BrirEvent::SweepCompleted {
            orientations: ORIENTATION_COUNT,
            elapsed: started.elapsed(),
        });

        if self.desc.normalize {
            if let Some(advisory) = normalize(&mut bank) {
                self.events.push(advisory);
            }
        }

        Ok(bank)
    }

    /// Serializes a bank at the desc's sample rate. Returns the written path.
    pub fn write_bank(
        &mut self,
        bank: &BrirBank,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let path = writer::write_bank(bank, self.desc.sample_rate, destination)?;
        self.events.push(BrirEvent::BankWritten {
            path: path.clone(),
            channels: bank.rows(),
            frames: bank.columns(),
        });
        Ok(path)
    }

    /// Renders and writes the bank of a loudspeaker array.
    pub fn write_loudspeaker_brirs(
        &mut self,
        destination: impl AsRef<Path>,
        signals: LoudspeakerSignals,
        hull: Arc<dyn Hull>,
        hrtf: Option<&HrtfSet>,
    ) -> Result<PathBuf> {
        let source = SpatialSource::array(signals, hull, self.desc.sample_rate);
        let bank = self.render_bank(&source, hrtf)?;
        self.write_bank(&bank, destination)
    }

    /// Renders and writes the bank of a spatial room description.
    pub fn write_room_brirs(
        &mut self,
        destination: impl AsRef<Path>,
        room: SpatialRoomDescription,
        hrtf: Option<&HrtfSet>,
    ) -> Result<PathBuf> {
        let source = SpatialSource::room(room);
        let bank = self.render_bank(&source, hrtf)?;
        self.write_bank(&bank, destination)
    }

    /// Drains the events collected since the last call.
    pub fn poll_events(&mut self) -> Vec<BrirEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrirBankError;
    use crate::hrtf::{regular_grid, write_hrtf_set};
    use crate::source::LoudspeakerLayout;

    fn loud_room() -> SpatialRoomDescription {
        SpatialRoomDescription::new(vec![3.0, -1.0], vec![0.0, 1.0], vec![1.5, 1.5]).unwrap()
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(BrirPipeline::new(BrirBankDesc::new().sample_rate(0)).is_err());
    }

    #[test]
    fn test_events_for_clipping_room() {
        let dir = tempfile::tempdir().unwrap();
        let hrtf = HrtfSet::identity(regular_grid(45, 45), 4, 48000).unwrap();
        let mut pipeline = BrirPipeline::new(BrirBankDesc::new()).unwrap();

        let path = pipeline
            .write_room_brirs(dir.path().join("room"), loud_room(), Some(&hrtf))
            .unwrap();
        assert_eq!(path, dir.path().join("room.wav"));

        let events = pipeline.poll_events();
        assert!(matches!(events[0], BrirEvent::SweepStarted { orientations: 360, frames: 5 }));
        assert!(matches!(events[1], BrirEvent::SweepCompleted { .. }));
        assert_eq!(events[2], BrirEvent::ClippingCorrected { peak: 3.0 });
        assert!(matches!(events[3], BrirEvent::BankWritten { channels: 720, frames: 5, .. }));
        assert!(pipeline.poll_events().is_empty());
    }

    #[test]
    fn test_normalization_can_be_disabled() {
        let hrtf = HrtfSet::identity(regular_grid(45, 45), 4, 48000).unwrap();
        let mut pipeline = BrirPipeline::new(BrirBankDesc::new().normalize(false)).unwrap();
        let bank = pipeline
            .render_bank(&SpatialSource::room(loud_room()), Some(&hrtf))
            .unwrap();
        assert_eq!(bank.peak(), 3.0);
        assert!(pipeline.poll_events().iter().all(|e| !e.is_advisory()));
    }

    #[test]
    fn test_provider_used_when_no_hrtf_given() {
        let dir = tempfile::tempdir().unwrap();
        let hrtf = HrtfSet::identity(regular_grid(30, 30), 8, 44100).unwrap();
        let hrtf_path = dir.path().join("custom.hrts");
        write_hrtf_set(&hrtf, &hrtf_path).unwrap();

        let desc = BrirBankDesc::new().sample_rate(44100).hrtf_path(&hrtf_path);
        let mut pipeline = BrirPipeline::new(desc).unwrap();
        let path = pipeline
            .write_loudspeaker_brirs(
                dir.path().join("array.wav"),
                LoudspeakerSignals::new(vec![vec![0.5, 0.25]; 2]).unwrap(),
                Arc::new(LoudspeakerLayout::horizontal_ring(2)),
                None,
            )
            .unwrap();
        assert!(path.exists());

        let events = pipeline.poll_events();
        assert!(matches!(
            events[0],
            BrirEvent::HrtfLoaded { sample_rate: 44100, ir_len: 8, dummy: false, .. }
        ));
    }

    #[test]
    fn test_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let hrtf = HrtfSet::identity(regular_grid(45, 45), 4, 44100).unwrap();
        let mut pipeline = BrirPipeline::new(BrirBankDesc::new()).unwrap();
        let target = dir.path().join("room.wav");

        let result = pipeline.write_room_brirs(&target, loud_room(), Some(&hrtf));
        assert!(matches!(result, Err(BrirBankError::SampleRateMismatch { .. })));
        assert!(!target.exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_rejected_run_reports_no_sweep() {
        let hrtf = HrtfSet::identity(regular_grid(45, 45), 4, 44100).unwrap();
        let mut pipeline = BrirPipeline::new(BrirBankDesc::new()).unwrap();

        let result = pipeline.render_bank(&SpatialSource::room(loud_room()), Some(&hrtf));
        assert!(matches!(result, Err(BrirBankError::SampleRateMismatch { .. })));
        assert!(pipeline.poll_events().is_empty());
    }

    #[test]
    fn test_cancel_handle_aborts_render() {
        let hrtf = HrtfSet::identity(regular_grid(45, 45), 4, 48000).unwrap();
        let mut pipeline = BrirPipeline::new(BrirBankDesc::new()).unwrap();
        pipeline
            .cancel_handle()
            .store(true, std::sync::atomic::Ordering::Relaxed);
        let result = pipeline.render_bank(&SpatialSource::room(loud_room()), Some(&hrtf));
        assert!(matches!(result, Err(BrirBankError::Cancelled { .. })));
    }
}
