use super::{GridPosition, HrtfSet};
use crate::error::{BrirBankError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// File extension used for HRTF containers.
pub const HRTF_CONTAINER_EXTENSION: &str = "hrts";

const MAGIC: &[u8; 4] = b"HRTS";
const VERSION: u32 = 1;

/// Reads an HRTF container.
///
/// # Layout (little endian)
///
/// ```text
/// magic "HRTS" | u32 version | u32 sample_rate | u32 ir_len | u32 positions
/// positions × { f32 azimuth | f32 colatitude | ir_len × f32 left | ir_len × f32 right }
/// ```
pub fn read_hrtf_set(path: impl AsRef<Path>) -> Result<HrtfSet> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let byte_len = file.metadata()?.len();
    let set = decode(BufReader::new(file), byte_len).map_err(|e| match e {
        BrirBankError::HrtfFormat(msg) => {
            BrirBankError::HrtfFormat(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    log::debug!(
        "Read HRTF container {} ({} positions, {} samples, {} Hz)",
        path.display(),
        set.grid_len(),
        set.ir_len(),
        set.sample_rate()
    );
    Ok(set)
}

/// Writes `set` as an HRTF container, see [`read_hrtf_set`] for the layout.
pub fn write_hrtf_set(set: &HrtfSet, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    encode(set, &mut writer)?;
    writer.flush()?;
    Ok(())
}

const HEADER_BYTES: u64 = 20;

/// Bytes a container with this header occupies, None on overflow.
fn container_len(positions: u64, ir_len: u64) -> Option<u64> {
    let per_position = ir_len.checked_mul(8)?.checked_add(8)?;
    positions.checked_mul(per_position)?.checked_add(HEADER_BYTES)
}

fn decode<R: Read>(mut reader: R, byte_len: u64) -> Result<HrtfSet> {
    let mut magic = [0u8; 4];
    read_or_truncated(reader.read_exact(&mut magic))?;
    if &magic != MAGIC {
        return Err(BrirBankError::HrtfFormat("not an HRTF container".to_string()));
    }

    let version = read_or_truncated(reader.read_u32::<LittleEndian>())?;
    if version != VERSION {
        return Err(BrirBankError::HrtfFormat(format!(
            "unsupported container version {}",
            version
        )));
    }

    let sample_rate = read_or_truncated(reader.read_u32::<LittleEndian>())?;
    let ir_len = read_or_truncated(reader.read_u32::<LittleEndian>())? as usize;
    let positions = read_or_truncated(reader.read_u32::<LittleEndian>())? as usize;
    if ir_len == 0 || positions == 0 {
        return Err(BrirBankError::HrtfFormat(format!(
            "empty set ({} positions of {} samples)",
            positions, ir_len
        )));
    }
    match container_len(positions as u64, ir_len as u64) {
        Some(needed) if needed <= byte_len => {}
        needed => {
            return Err(BrirBankError::HrtfFormat(format!(
                "truncated container: header describes {} positions of {} samples \
                 ({} bytes), found {} bytes",
                positions,
                ir_len,
                needed.map_or_else(|| "too many".to_string(), |n| n.to_string()),
                byte_len
            )));
        }
    }

    let mut grid = Vec::with_capacity(positions);
    let mut left = vec![0.0f32; positions * ir_len];
    let mut right = vec![0.0f32; positions * ir_len];

    for (l, r) in left
        .chunks_exact_mut(ir_len)
        .zip(right.chunks_exact_mut(ir_len))
    {
        let azimuth = read_or_truncated(reader.read_f32::<LittleEndian>())?;
        let colatitude = read_or_truncated(reader.read_f32::<LittleEndian>())?;
        grid.push(GridPosition::new(azimuth, colatitude));
        read_or_truncated(reader.read_f32_into::<LittleEndian>(l))?;
        read_or_truncated(reader.read_f32_into::<LittleEndian>(r))?;
    }

    Ok(HrtfSet::from_flat(left, right, grid, ir_len, sample_rate))
}

fn encode<W: Write>(set: &HrtfSet, writer: &mut W) -> Result<()> {
    let ir_len = set.ir_len();

    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(VERSION)?;
    writer.write_u32::<LittleEndian>(set.sample_rate())?;
    writer.write_u32::<LittleEndian>(ir_len as u32)?;
    writer.write_u32::<LittleEndian>(set.grid_len() as u32)?;

    let rows = set
        .left_flat()
        .chunks_exact(ir_len)
        .zip(set.right_flat().chunks_exact(ir_len));
    for (position, (left, right)) in set.grid().iter().zip(rows) {
        writer.write_f32::<LittleEndian>(position.azimuth)?;
        writer.write_f32::<LittleEndian>(position.colatitude)?;
        for &s in left.iter().chain(right.iter()) {
            writer.write_f32::<LittleEndian>(s)?;
        }
    }
    Ok(())
}

fn read_or_truncated<T>(result: std::io::Result<T>) -> Result<T> {
    result.map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => BrirBankError::HrtfFormat("truncated container".to_string()),
        _ => BrirBankError::IoFailure(e),
    })
}
