use super::{read_hrtf_set, HrtfSet};
use crate::config::BrirBankDesc;
use crate::error::{BrirBankError, Result};
use std::path::{Path, PathBuf};

/// Built-in HRTF profiles: sample rate and container file name inside the data directory.
pub const DEFAULT_HRTF_PROFILES: &[(u32, &str)] = &[
    (44100, "hrtf_default_44k.hrts"),
    (48000, "hrtf_default_48k.hrts"),
];

/// Path of the default HRTF container for `sample_rate` inside `data_dir`.
pub fn default_hrtf_file(data_dir: &Path, sample_rate: u32) -> Result<PathBuf> {
    DEFAULT_HRTF_PROFILES
        .iter()
        .find(|(rate, _)| *rate == sample_rate)
        .map(|(_, file)| data_dir.join(file))
        .ok_or(BrirBankError::UnsupportedSampleRate { sample_rate })
}

/// Loads an HRTF set for `sample_rate`.
///
/// * `source` - explicit container; `None` selects the default profile in `data_dir`
/// * `dummy` - replace every response by a unit impulse at sample 0
///
/// The returned set always runs at `sample_rate`.
pub fn provide(
    sample_rate: u32,
    source: Option<&Path>,
    dummy: bool,
    data_dir: &Path,
) -> Result<HrtfSet> {
    let set = match source {
        Some(path) => read_hrtf_set(path)?,
        None => {
            let path = default_hrtf_file(data_dir, sample_rate)?;
            match read_hrtf_set(&path) {
                Ok(set) => set,
                Err(BrirBankError::IoFailure(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(BrirBankError::MissingDefaultData { sample_rate, path });
                }
                Err(e) => return Err(e),
            }
        }
    };

    if set.sample_rate() != sample_rate {
        return Err(BrirBankError::SampleRateMismatch {
            expected: sample_rate,
            found: set.sample_rate(),
        });
    }

    let set = if dummy { set.into_dummy() } else { set };

    log::info!(
        "Loaded HRTF set: {} positions, {} samples, {} Hz{}",
        set.grid_len(),
        set.ir_len(),
        set.sample_rate(),
        if dummy { " (dummy)" } else { "" }
    );
    Ok(set)
}

/// HRTF provider bound to the settings of a [`BrirBankDesc`].
#[derive(Debug, Clone)]
pub struct HrtfProvider {
    sample_rate: u32,
    source: Option<PathBuf>,
    dummy: bool,
    data_dir: PathBuf,
}

impl HrtfProvider {
    pub fn from_desc(desc: &BrirBankDesc) -> Self {
        Self {
            sample_rate: desc.sample_rate,
            source: desc.hrtf_path.clone(),
            dummy: desc.dummy_hrtf,
            data_dir: desc.data_dir.clone(),
        }
    }

    pub fn load(&self) -> Result<HrtfSet> {
        provide(
            self.sample_rate,
            self.source.as_deref(),
            self.dummy,
            &self.data_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hrtf::{regular_grid, write_hrtf_set};

    fn write_set(dir: &Path, name: &str, sample_rate: u32) -> PathBuf {
        let grid = regular_grid(90, 45);
        let left = vec![vec![0.5, 0.25, 0.125]; grid.len()];
        let right = vec![vec![-0.5, 0.0, 0.75]; grid.len()];
        let set = HrtfSet::new(left, right, grid, sample_rate).unwrap();
        let path = dir.join(name);
        write_hrtf_set(&set, &path).unwrap();
        path
    }

    #[test]
    fn test_default_profile_lookup() {
        let dir = Path::new("/data");
        assert_eq!(
            default_hrtf_file(dir, 48000).unwrap(),
            dir.join("hrtf_default_48k.hrts")
        );
        assert!(matches!(
            default_hrtf_file(dir, 96000),
            Err(BrirBankError::UnsupportedSampleRate { sample_rate: 96000 })
        ));
    }

    #[test]
    fn test_unsupported_rate_without_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            provide(22050, None, false, dir.path()),
            Err(BrirBankError::UnsupportedSampleRate { .. })
        ));
    }

    #[test]
    fn test_missing_default_data() {
        let dir = tempfile::tempdir().unwrap();
        match provide(44100, None, false, dir.path()) {
            Err(BrirBankError::MissingDefaultData { sample_rate, path }) => {
                assert_eq!(sample_rate, 44100);
                assert!(path.ends_with("hrtf_default_44k.hrts"));
            }
            other => panic!("unexpected result: {:?}", other.map(|s| s.grid_len())),
        }
    }

    #[test]
    fn test_default_set_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        write_set(dir.path(), "hrtf_default_48k.hrts", 48000);

        let set = provide(48000, None, false, dir.path()).unwrap();
        assert_eq!(set.sample_rate(), 48000);
        assert_eq!(set.left(0), &[0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_explicit_source_with_wrong_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_set(dir.path(), "custom.hrts", 44100);

        assert!(matches!(
            provide(48000, Some(&path), false, dir.path()),
            Err(BrirBankError::SampleRateMismatch {
                expected: 48000,
                found: 44100
            })
        ));
    }

    #[test]
    fn test_dummy_replaces_responses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_set(dir.path(), "custom.hrts", 44100);

        let provider = HrtfProvider::from_desc(
            &BrirBankDesc::new()
                .sample_rate(44100)
                .hrtf_path(&path)
                .dummy_hrtf(true)
                .data_dir(dir.path()),
        );
        let set = provider.load().unwrap();
        for g in 0..set.grid_len() {
            assert_eq!(set.left(g), &[1.0, 0.0, 0.0]);
            assert_eq!(set.right(g), &[1.0, 0.0, 0.0]);
        }
    }
}
