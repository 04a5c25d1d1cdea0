//! Append-only CSV stores for practice events and completed sessions.
//!
//! Both files carry a header row and are read positionally so that rows
//! written under an older, narrower schema still load.

pub mod events;
pub mod sessions;

pub use events::{EventLog, EventType, PracticeEvent};
pub use sessions::{SessionLog, SessionSummary};

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// A row the reader gave up on. Logged and dropped, never returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptRecord {
    pub line: Option<u64>,
    pub reason: String,
}

/// Open `path` for appending, writing `header` first when the file is new or empty
pub(crate) fn open_for_append(path: &Path, header: &[&str]) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    if needs_header {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&file);
        writer.write_record(header).map_err(io::Error::from)?;
        writer.flush()?;
    }

    Ok(file)
}

/// Read every data record, skipping the header and anything the CSV layer rejects
pub(crate) fn read_records(path: &Path) -> io::Result<Vec<(Option<u64>, csv::StringRecord)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(io::Error::from)?;

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line());
                records.push((line, record));
            }
            Err(err) if err.is_io_error() => return Err(io::Error::from(err)),
            Err(err) => {
                let corrupt = CorruptRecord {
                    line: err.position().map(|p| p.line()),
                    reason: err.to_string(),
                };
                tracing::warn!(?corrupt, path = %path.display(), "skipping undecodable row");
            }
        }
    }

    Ok(records)
}

/// Field at `idx`, or empty when the row predates that column
pub(crate) fn field(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}
