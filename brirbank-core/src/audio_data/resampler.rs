use crate::error::{BrirBankError, Result};

/// Offline single-channel resampler built on rubato's FFT resampler.
pub struct AudioResampler {
    source_sample_rate: u32,
    target_sample_rate: u32,
    chunk_size: usize,
}

impl AudioResampler {
    pub fn new(
        source_sample_rate: u32,
        target_sample_rate: u32,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        if source_sample_rate == 0 || target_sample_rate == 0 {
            return Err(BrirBankError::AudioFormat(
                "Sample rates must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            source_sample_rate,
            target_sample_rate,
            chunk_size: chunk_size.unwrap_or(1024).max(1),
        })
    }

    /// Resamples one channel.
    ///
    /// The output holds `ceil(len * ratio)` samples aligned with the input: the
    /// resampler's output delay is dropped and zero chunks are fed until the tail
    /// has been flushed.
    pub fn resample_channel(&self, channel_samples: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(channel_samples.to_vec());
        }

        use rubato::{FftFixedIn, Resampler};

        let mut resampler = FftFixedIn::<f32>::new(
            self.source_sample_rate as usize,
            self.target_sample_rate as usize,
            self.chunk_size,
            2, // sub_chunks
            1, // single channel
        )
        .map_err(|e| BrirBankError::AudioLoading(format!("Failed to create resampler: {}", e)))?;

        let expected_len = self.output_len(channel_samples.len());
        let mut output_buffer = Vec::with_capacity(expected_len + resampler.output_frames_max());

        let chunk_size = resampler.input_frames_next();
        let mut input_chunk = vec![0.0f32; chunk_size];
        let mut input_index = 0;
        let mut delay_left = resampler.output_delay();

        // Keep feeding (zero padded) chunks until enough delay-free output exists
        while output_buffer.len() < expected_len {
            input_chunk.fill(0.0);
            if input_index < channel_samples.len() {
                let end_index = (input_index + chunk_size).min(channel_samples.len());
                input_chunk[..end_index - input_index]
                    .copy_from_slice(&channel_samples[input_index..end_index]);
                input_index = end_index;
            }

            let waves_out = resampler
                .process(&[&input_chunk[..]], None)
                .map_err(|e| BrirBankError::AudioLoading(format!("Resampling error: {}", e)))?;

            if let Some(first_channel) = waves_out.first() {
                let skip = delay_left.min(first_channel.len());
                delay_left -= skip;
                output_buffer.extend_from_slice(&first_channel[skip..]);
            }
        }

        output_buffer.truncate(expected_len);
        Ok(output_buffer)
    }

    pub fn output_len(&self, input_len: usize) -> usize {
        (input_len as u64 * self.target_sample_rate as u64).div_ceil(self.source_sample_rate as u64)
            as usize
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }
}
