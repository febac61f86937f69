use crate::{
    audio_data::{AudioDataLoader, AudioSignal, LoadOptions},
    error::{BrirBankError, Result},
};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Default loader implementation using the Symphonia decoder library.
///
/// Decodes any format Symphonia supports (WAV including 32-bit float, FLAC, ...)
/// into f32 samples and keeps every channel of the file.
///
/// ```ignore
/// use brirbank_core::audio_data::{AudioDataLoader, DefaultAudioLoader, LoadOptions};
///
/// let irs = DefaultAudioLoader.load("array_irs.wav", &LoadOptions::default())?;
/// ```
pub struct DefaultAudioLoader;

impl AudioDataLoader for DefaultAudioLoader {
    fn load(&self, path: &str, options: &LoadOptions) -> Result<Arc<AudioSignal>> {
        let file = File::open(path)?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                BrirBankError::AudioLoading(format!("Failed to probe audio format: {:?}", e))
            })?;

        let mut format = probed.format;

        let track = format.default_track().ok_or_else(|| {
            BrirBankError::AudioLoading("No default audio track found".to_string())
        })?;
        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| BrirBankError::AudioLoading("Sample rate not found".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| BrirBankError::AudioLoading("Channel count not found".to_string()))?
            .count();

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                BrirBankError::AudioLoading(format!("Failed to create decoder: {:?}", e))
            })?;

        let mut interleaved: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(BrirBankError::AudioLoading(format!(
                        "Error reading packet: {:?}",
                        e
                    )));
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break,
                // A corrupted impulse response is not recoverable by skipping packets
                Err(e) => {
                    return Err(BrirBankError::AudioLoading(format!(
                        "Error decoding packet: {:?}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let mut tmp = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            tmp.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(tmp.samples());
        }

        let signal = AudioSignal::from_interleaved(&interleaved, sample_rate, channels)?;

        log::debug!(
            "Loaded {}: {} channels, {} frames, {} Hz",
            path,
            signal.channels(),
            signal.frames(),
            signal.sample_rate()
        );

        let signal = match options.target_sample_rate {
            Some(rate) if rate != sample_rate => signal.resample(rate)?,
            _ => signal,
        };

        Ok(Arc::new(signal))
    }
}
