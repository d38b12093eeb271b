//! Shared environment configuration for the Qwixx binaries.
//!
//! Consolidates `QWIXX_BASE_PATH`, `RAYON_NUM_THREADS` and `QWIXX_TABLE`
//! reads, plus logger setup.

use std::path::PathBuf;

use crate::constants::DEFAULT_TABLE_PATH;
use crate::error::Result;

/// Start `flexi_logger` at `info`, overridable through `RUST_LOG`.
pub fn init_logging() -> std::result::Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    flexi_logger::Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()
}

/// Read `QWIXX_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> Result<PathBuf> {
    let base_path = std::env::var("QWIXX_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    log::debug!("QWIXX_BASE_PATH={}", base_path);
    std::env::set_current_dir(&base_path)?;
    let cwd = std::env::current_dir()?;
    log::info!("Working directory: {}", cwd.display());
    Ok(PathBuf::from(base_path))
}

fn thread_count() -> usize {
    std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n: &usize| n > 0)
        .unwrap_or(8)
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8) and
/// build the rayon global pool. Returns the thread count.
pub fn init_rayon_threads() -> Result<usize> {
    let num_threads = thread_count();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    log::info!("Rayon threads: {}", num_threads);
    Ok(num_threads)
}

/// Table path: `QWIXX_TABLE` or the default `data/qwixx.bin`.
pub fn table_path() -> PathBuf {
    std::env::var("QWIXX_TABLE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_TABLE_PATH))
}
