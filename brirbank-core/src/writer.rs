//! BRIR bank serialization as a 720 channel 32-bit float WAV file.

use crate::bank::BrirBank;
use crate::error::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension every written bank carries.
pub const BANK_EXTENSION: &str = "wav";

/// Appends `.wav` unless the path already ends with it.
///
/// `room` becomes `room.wav`, `room.bin` becomes `room.bin.wav`.
pub fn with_bank_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == BANK_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(BANK_EXTENSION);
    PathBuf::from(name)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Writes `bank` with one channel per row, frames interleaved as
/// `[L0, R0, L1, R1, ..., L359, R359]`.
///
/// The file is written next to the destination and moved into place once
/// complete, so a failed write never leaves a truncated bank behind. Returns the
/// path actually written.
pub fn write_bank(
    bank: &BrirBank,
    sample_rate: u32,
    destination: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = with_bank_extension(destination);
    let partial = partial_path(&path);

    if let Err(e) = write_frames(bank, sample_rate, &partial) {
        // the partial file may not exist, nothing else to clean up
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&partial, &path) {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }

    log::info!(
        "Wrote {} channels x {} frames at {} Hz to {}",
        bank.rows(),
        bank.columns(),
        sample_rate,
        path.display()
    );
    Ok(path)
}

fn write_frames(bank: &BrirBank, sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: bank.rows() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for column in 0..bank.columns() {
        for sample in bank.frame(column) {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;
    Ok(())
}
