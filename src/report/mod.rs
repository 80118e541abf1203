//! Report module - per-day output files and run summary

pub mod csv_export;
pub mod guestlist_export;
pub mod summary;

pub use csv_export::*;
pub use guestlist_export::*;
pub use summary::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{GuestlistError, Result};
use crate::pipeline::DayBuckets;

/// Output path for a ticket type: `<dir>/<sanitized ticket type>.<ext>`.
///
/// Spaces, `/` and `&` become `_`, then runs of `___` and `__` collapse to `_`.
pub fn day_file_name(dir: &Path, ticket_type: &str, ext: &str) -> PathBuf {
    let stem = ticket_type
        .replace([' ', '/', '&'], "_")
        .replace("___", "_")
        .replace("__", "_");
    dir.join(format!("{stem}.{ext}"))
}

/// Output path of every day bucket, in bucket order.
///
/// Fails when two ticket types sanitize to the same file name.
pub fn day_file_paths(days: &DayBuckets, dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::with_capacity(days.len());
    let mut paths = Vec::with_capacity(days.len());
    for bucket in days {
        let path = day_file_name(dir, &bucket.ticket_type, ext);
        if let Some(first) = seen.insert(path.clone(), &bucket.ticket_type) {
            return Err(GuestlistError::FileNameCollision {
                first: first.to_string(),
                second: bucket.ticket_type.clone(),
                path,
            });
        }
        paths.push(path);
    }
    Ok(paths)
}

/// Write rendered files in order.
///
/// When a write fails, the files already written by this call are removed
/// before the error is returned.
pub fn write_files(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    for (done, (path, contents)) in files.iter().enumerate() {
        if let Err(e) = std::fs::write(path, contents) {
            for (written, _) in &files[..done] {
                if let Err(cleanup) = std::fs::remove_file(written) {
                    warn!("could not remove {}: {}", written.display(), cleanup);
                }
            }
            return Err(GuestlistError::io(path, e));
        }
    }
    Ok(())
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| GuestlistError::io(dir, e))
}
