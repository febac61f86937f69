use brirbank_core::audio_data::AudioSignal;
use brirbank_core::hrtf::{default_hrtf_file, regular_grid, write_hrtf_set};
use brirbank_core::*;
use std::path::Path;
use std::sync::Arc;

const SAMPLE_RATE: u32 = 48000;

/// Writes a non-trivial 256-sample set as the 48 kHz default.
fn install_default_hrtf(data_dir: &Path) {
    let grid = regular_grid(15, 15);
    let left: Vec<Vec<f32>> = (0..grid.len())
        .map(|g| (0..256).map(|n| ((g + n) % 7) as f32 * 0.01).collect())
        .collect();
    let right: Vec<Vec<f32>> = left.iter().map(|ir| ir.iter().rev().copied().collect()).collect();
    let set = HrtfSet::new(left, right, grid, SAMPLE_RATE).unwrap();
    write_hrtf_set(&set, default_hrtf_file(data_dir, SAMPLE_RATE).unwrap()).unwrap();
}

fn array_irs() -> Vec<Vec<f32>> {
    (0..16)
        .map(|l| {
            let mut ir = vec![0.0f32; 128];
            ir[l] = 0.05;
            ir[l * 4 + 3] = -0.02;
            ir
        })
        .collect()
}

fn read_bank(path: &Path) -> (hound::WavSpec, u32, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let frames = reader.duration();
    let samples = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    (spec, frames, samples)
}

fn channel(samples: &[f32], index: usize) -> Vec<f32> {
    samples.iter().skip(index).step_by(720).copied().collect()
}

#[test]
fn test_sixteen_loudspeaker_bank_with_dummy_hrtf() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    install_default_hrtf(dir.path());

    let desc = BrirBankDesc::new()
        .sample_rate(SAMPLE_RATE)
        .dummy_hrtf(true)
        .data_dir(dir.path());
    let mut pipeline = BrirPipeline::new(desc).unwrap();
    let hrtf = pipeline.load_hrtf().unwrap();
    assert_eq!(hrtf.ir_len(), 256);

    let layout: Arc<dyn Hull> = Arc::new(LoudspeakerLayout::horizontal_ring(16));
    let signals = LoudspeakerSignals::new(array_irs()).unwrap();
    let path = pipeline
        .write_loudspeaker_brirs(
            dir.path().join("array_brirs"),
            signals.clone(),
            Arc::clone(&layout),
            Some(&hrtf),
        )
        .unwrap();
    assert_eq!(path.extension().unwrap(), "wav");

    let (spec, frames, samples) = read_bank(&path);
    assert_eq!(spec.channels, 720);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(frames, 383);

    let (left, right) = layout
        .binauralize(&signals, SAMPLE_RATE, Orientation::forward(), &hrtf)
        .unwrap();
    assert_eq!(channel(&samples, 0), left);
    assert_eq!(channel(&samples, 1), right);

    // identity responses: every orientation hears the sum of all loudspeakers
    let source = SpatialSource::array(signals, layout, SAMPLE_RATE);
    let (left_90, _) = source.render_orientation(90, &hrtf).unwrap();
    assert_eq!(channel(&samples, 180), left_90);
    assert_eq!(left_90, left);

    let events = pipeline.poll_events();
    assert!(events.iter().all(|e| !e.is_advisory()));
    assert!(events
        .iter()
        .any(|e| matches!(e, BrirEvent::BankWritten { channels: 720, frames: 383, .. })));
}

#[test]
fn test_rate_mismatch_produces_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let hrtf = HrtfSet::identity(regular_grid(30, 30), 256, 44100).unwrap();
    let mut pipeline = BrirPipeline::new(BrirBankDesc::new().sample_rate(SAMPLE_RATE)).unwrap();

    let target = dir.path().join("array_brirs.wav");
    let result = pipeline.write_loudspeaker_brirs(
        &target,
        LoudspeakerSignals::new(array_irs()).unwrap(),
        Arc::new(LoudspeakerLayout::horizontal_ring(16)),
        Some(&hrtf),
    );
    assert!(matches!(
        result,
        Err(BrirBankError::SampleRateMismatch {
            expected: 48000,
            found: 44100
        })
    ));
    assert!(!target.exists());
}

#[test]
fn test_missing_default_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = BrirPipeline::new(BrirBankDesc::new().data_dir(dir.path())).unwrap();
    let room = SpatialRoomDescription::new(vec![1.0], vec![0.0], vec![1.0]).unwrap();
    let result = pipeline.write_room_brirs(dir.path().join("room"), room, None);
    assert!(matches!(
        result,
        Err(BrirBankError::MissingDefaultData {
            sample_rate: 48000,
            ..
        })
    ));
}

#[test]
fn test_room_bank_from_sdm_file() {
    let dir = tempfile::tempdir().unwrap();
    let sdm_path = dir.path().join("sdm.wav");
    let spec = hound::WavSpec {
        channels: 3,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&sdm_path, spec).unwrap();
    // [pressure, azimuth, colatitude] per frame, second arrival without a direction
    for frame in [[2.0f32, 0.5, 1.2], [0.0, 0.0, 1.5], [-1.0, f32::NAN, f32::NAN]] {
        for sample in frame {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();

    let signal = AudioSignal::from_path(sdm_path.to_str().unwrap()).unwrap();
    let room = SpatialRoomDescription::from_audio(&signal)
        .unwrap()
        .sanitize_nan();
    assert!(room.azimuth().iter().all(|a| !a.is_nan()));

    let hrtf = HrtfSet::identity(regular_grid(10, 10), 32, SAMPLE_RATE).unwrap();
    let mut pipeline = BrirPipeline::new(BrirBankDesc::new()).unwrap();
    let path = pipeline
        .write_room_brirs(dir.path().join("room.bin"), room, Some(&hrtf))
        .unwrap();
    assert_eq!(path, dir.path().join("room.bin.wav"));

    let (spec, frames, samples) = read_bank(&path);
    assert_eq!(spec.channels, 720);
    assert_eq!(frames, 3 + 32 - 1);
    // peak 2.0 rescaled to full scale
    assert_eq!(channel(&samples, 0)[..3], [1.0, 0.0, -0.5]);

    let events = pipeline.poll_events();
    assert!(events.contains(&BrirEvent::ClippingCorrected { peak: 2.0 }));
}
