//! Audio input: multichannel impulse responses and SDM signals read from disk

mod default_loader;
mod load_options;
mod loader;
mod resampler;

use crate::error::{BrirBankError, Result};
pub use default_loader::DefaultAudioLoader;
pub use load_options::LoadOptions;
pub use loader::AudioDataLoader;
pub use resampler::AudioResampler;
use std::sync::Arc;
use std::time::Duration;

/// Multichannel signal with reference-counted sharing.
///
/// Samples are stored **planar**: channel `c` occupies
/// `c * frames..(c + 1) * frames`. Impulse responses are consumed one channel
/// (loudspeaker, or pressure / azimuth / colatitude track) at a time, so the
/// interleaved layout of the decoded file is split once at load time.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    inner: Arc<AudioSignalInner>,
}

#[derive(Debug)]
struct AudioSignalInner {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
    frames: usize,
}

impl AudioSignal {
    /// Builds a signal from one vector per channel. All channels must have the same length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(BrirBankError::AudioFormat(
                "Signal needs at least one channel".to_string(),
            ));
        }
        let frames = channels[0].len();
        if let Some(ch) = channels.iter().position(|c| c.len() != frames) {
            return Err(BrirBankError::AudioFormat(format!(
                "Channel {} has {} frames, expected {}",
                ch,
                channels[ch].len(),
                frames
            )));
        }

        let channel_count = channels.len();
        Ok(Self::from_planar(
            channels.concat(),
            sample_rate,
            channel_count,
        ))
    }

    /// Splits interleaved frames (`[c0, c1, .., c0, c1, ..]`) into a planar signal.
    pub fn from_interleaved(
        interleaved: &[f32],
        sample_rate: u32,
        channels: usize,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(BrirBankError::AudioFormat(
                "Channel count must be greater than 0".to_string(),
            ));
        }
        if interleaved.len() % channels != 0 {
            return Err(BrirBankError::AudioFormat(format!(
                "{} samples do not divide into {} channels",
                interleaved.len(),
                channels
            )));
        }

        let frames = interleaved.len() / channels;
        let mut samples = vec![0.0f32; interleaved.len()];
        for (frame_idx, frame) in interleaved.chunks_exact(channels).enumerate() {
            for (ch, &s) in frame.iter().enumerate() {
                samples[ch * frames + frame_idx] = s;
            }
        }
        Ok(Self::from_planar(samples, sample_rate, channels))
    }

    fn from_planar(samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        let frames = samples.len() / channels;
        Self {
            inner: Arc::new(AudioSignalInner {
                samples,
                sample_rate,
                channels,
                frames,
            }),
        }
    }

    /// Load a signal with the default Symphonia-based loader.
    pub fn from_path(path: &str) -> Result<Arc<Self>> {
        DefaultAudioLoader.load(path, &LoadOptions::default())
    }

    pub fn from_path_with_options(path: &str, options: &LoadOptions) -> Result<Arc<Self>> {
        DefaultAudioLoader.load(path, options)
    }

    pub fn from_path_with_loader<L: AudioDataLoader>(
        path: &str,
        loader: &L,
        options: &LoadOptions,
    ) -> Result<Arc<Self>> {
        loader.load(path, options)
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.inner.channels
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.inner.frames
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.inner.frames as f64 / self.inner.sample_rate.max(1) as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.frames == 0
    }

    /// Samples of one channel (0-indexed).
    pub fn channel(&self, channel: usize) -> Result<&[f32]> {
        if channel >= self.inner.channels {
            return Err(BrirBankError::AudioFormat(format!(
                "Channel {} out of range (channels: {})",
                channel, self.inner.channels
            )));
        }
        let frames = self.inner.frames;
        Ok(&self.inner.samples[channel * frames..(channel + 1) * frames])
    }

    /// Iterates over the channels in order.
    pub fn channel_iter(&self) -> impl Iterator<Item = &[f32]> {
        let frames = self.inner.frames;
        let samples = &self.inner.samples;
        (0..self.inner.channels).map(move |ch| &samples[ch * frames..(ch + 1) * frames])
    }

    /// Resample every channel with rubato, returns a new signal.
    pub fn resample(&self, target_sample_rate: u32) -> Result<Self> {
        if target_sample_rate == self.inner.sample_rate {
            return Ok(self.clone());
        }

        let resampler = AudioResampler::new(
            self.inner.sample_rate,
            target_sample_rate,
            Some(1024), // chunk_size
        )?;

        let channels = self
            .channel_iter()
            .map(|ch| resampler.resample_channel(ch))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Resampled {} channels from {} Hz to {} Hz",
            channels.len(),
            self.inner.sample_rate,
            target_sample_rate
        );

        Self::from_channels(channels, target_sample_rate)
    }
}
