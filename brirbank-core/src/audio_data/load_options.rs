#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Resample every channel to this rate after decoding (None = keep the file's rate)
    pub target_sample_rate: Option<u32>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = Some(rate);
        self
    }
}
