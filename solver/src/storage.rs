//! Binary I/O for the value table.
//!
//! Format: float32[5,468,125] in Markov index order, native byte order, no
//! header. Total file size: 21,872,500 bytes (~21 MB). Pending entries are
//! stored as NaN and end-of-game entries as negative infinity.
//!
//! With the `full` feature, loading memory-maps the file via `memmap2`;
//! otherwise the file is read into an owned buffer.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::constants::*;
use crate::error::{Result, SolverError};
use crate::types::StateValues;

/// Exact size of a valid table file in bytes.
pub const TABLE_FILE_BYTES: u64 = (MARKOV_STATES * std::mem::size_of::<f32>()) as u64;

pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

fn check_size(actual: u64) -> Result<()> {
    if actual != TABLE_FILE_BYTES {
        return Err(SolverError::TableSize {
            expected: TABLE_FILE_BYTES,
            actual,
        });
    }
    Ok(())
}

/// Load a value table. A file of the wrong length is rejected.
pub fn load_state_values(path: impl AsRef<Path>) -> Result<StateValues> {
    let path = path.as_ref();
    let start_time = Instant::now();
    log::info!("Loading state values from {}...", path.display());

    let file = File::open(path)?;
    check_size(file.metadata()?.len())?;
    let values = map_or_read(file)?;

    log::info!(
        "Loaded {} states in {:.2} ms ({} pending)",
        MARKOV_STATES,
        start_time.elapsed().as_secs_f64() * 1000.0,
        values.pending_count()
    );
    Ok(values)
}

#[cfg(feature = "full")]
fn map_or_read(file: File) -> Result<StateValues> {
    // SAFETY: the table file is treated as immutable once written.
    let mmap = unsafe { memmap2::Mmap::map(&file) }?;
    Ok(StateValues::Mmap { mmap })
}

#[cfg(not(feature = "full"))]
fn map_or_read(mut file: File) -> Result<StateValues> {
    use std::io::Read;

    let mut bytes = Vec::with_capacity(TABLE_FILE_BYTES as usize);
    file.read_to_end(&mut bytes)?;
    let values = bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok(StateValues::Owned(values))
}

/// Save a value table as a flat dump in Markov index order.
pub fn save_state_values(values: &StateValues, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let start_time = Instant::now();
    log::info!("Saving state values to {}...", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let slice = values.as_slice();
    let data_bytes = unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    };
    let mut f = File::create(path)?;
    f.write_all(data_bytes)?;
    f.flush()?;

    log::info!(
        "Saved {} states in {:.2} ms",
        slice.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
