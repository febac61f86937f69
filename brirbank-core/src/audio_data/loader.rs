use crate::audio_data::{AudioSignal, LoadOptions};
use crate::error::Result;
use std::sync::Arc;

/// Trait for loading multichannel signals from file paths.
///
/// Loudspeaker impulse responses and SDM tracks reach the pipeline through this
/// seam. brirbank ships a Symphonia-based [`DefaultAudioLoader`](super::DefaultAudioLoader);
/// bring your own for formats Symphonia cannot decode.
///
/// # Example
///
/// ```ignore
/// use brirbank_core::audio_data::{AudioDataLoader, AudioSignal, LoadOptions};
/// use brirbank_core::error::Result;
/// use std::sync::Arc;
///
/// struct MatLoader;
///
/// impl AudioDataLoader for MatLoader {
///     fn load(&self, path: &str, options: &LoadOptions) -> Result<Arc<AudioSignal>> {
///         todo!()
///     }
/// }
/// ```
pub trait AudioDataLoader {
    /// Loads the file at `path` as one channel per track.
    ///
    /// # Errors
    ///
    /// Returns a `BrirBankError` if the file cannot be opened, decoded or resampled.
    fn load(&self, path: &str, options: &LoadOptions) -> Result<Arc<AudioSignal>>;
}
