//! Per-day guest list CSV export

use std::path::{Path, PathBuf};

use csv::Writer;

use crate::error::{GuestlistError, Result};
use crate::pipeline::{DayBucket, DayBuckets};
use crate::report::{day_file_paths, ensure_dir, write_files};

/// A file produced for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDay {
    pub ticket_type: String,
    pub path: PathBuf,
    pub guests: usize,
}

fn render_day(bucket: &DayBucket, path: &Path) -> Result<Vec<u8>> {
    let csv_err = |source: csv::Error| GuestlistError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut wtr = Writer::from_writer(Vec::new());
    for g in &bucket.members {
        wtr.serialize(g).map_err(csv_err)?;
    }
    wtr.into_inner()
        .map_err(|e| GuestlistError::io(path, e.into_error()))
}

/// Write one `email,name,role,affiliation` CSV per day bucket into `dir`.
///
/// Every file is rendered before the first write. A failed write removes the
/// day files already written in this run.
pub fn write_day_csvs(days: &DayBuckets, dir: &Path) -> Result<Vec<WrittenDay>> {
    let paths = day_file_paths(days, dir, "csv")?;

    let mut files = Vec::with_capacity(days.len());
    let mut written = Vec::with_capacity(days.len());
    for (bucket, path) in days.iter().zip(paths) {
        files.push((path.clone(), render_day(bucket, &path)?));
        written.push(WrittenDay {
            ticket_type: bucket.ticket_type.clone(),
            guests: bucket.members.len(),
            path,
        });
    }

    ensure_dir(dir)?;
    write_files(&files)?;
    Ok(written)
}
