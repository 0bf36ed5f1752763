//! Per-file worker: read, optimize, commit atomically.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tracing::{debug, warn};

use super::report::FileReport;
use super::FileJob;
use crate::optimize::{optimize_tile, TileOutcome};
use crate::transcode::TranscodeSettings;
use crate::{Error, Result};

/// Process one file end to end.
///
/// Never fails: every error is folded into the returned report, and the
/// original bytes always end up at the destination (or stay in place).
pub fn process_file(job: &FileJob, settings: &TranscodeSettings, stop: &AtomicBool) -> FileReport {
    if stop.load(Ordering::SeqCst) {
        return FileReport::interrupted(job.relative.clone());
    }

    debug!("Processing {:?}", job.source);

    let original = match fs::read(&job.source) {
        Ok(data) => Bytes::from(data),
        Err(e) => return FileReport::failed(job.relative.clone(), Error::io(&job.source, e)),
    };

    let outcome = optimize_tile(original.clone(), settings);
    settle(job, &original, outcome, stop)
}

/// Commit the result of optimizing `original` and report it.
fn settle(
    job: &FileJob,
    original: &[u8],
    outcome: Result<TileOutcome>,
    stop: &AtomicBool,
) -> FileReport {
    let path = job.relative.clone();
    match outcome {
        Ok(TileOutcome::Optimized { data, images }) => {
            let shrunk = images.iter().filter(|i| i.is_smaller()).count();
            match commit(job, &data, stop) {
                Ok(true) => {
                    FileReport::optimized(path, original.len() as u64, data.len() as u64, shrunk)
                }
                Ok(false) => FileReport::interrupted(path),
                Err(e) => {
                    warn!("Failed to write {:?}: {}", job.destination, e);
                    fall_back(job, original, e, stop)
                }
            }
        }
        Ok(TileOutcome::Unchanged(reason)) => {
            debug!("Passing through {:?}: {}", job.source, reason);
            match keep_original(job, original, stop) {
                Ok(true) => FileReport::passed_through(path, reason),
                Ok(false) => FileReport::interrupted(path),
                Err(e) => FileReport::failed(path, e),
            }
        }
        Err(e) => {
            warn!("Passing through {:?} after error: {}", job.source, e);
            fall_back(job, original, e, stop)
        }
    }
}

/// Report `error` for a job whose worker panicked, copying the original
/// to the destination first.
pub(super) fn recover(job: &FileJob, error: Error, stop: &AtomicBool) -> FileReport {
    warn!("Worker for {:?} died: {}", job.source, error);
    if job.is_in_place() {
        return FileReport::failed(job.relative.clone(), error);
    }
    match fs::read(&job.source) {
        Ok(original) => fall_back(job, &original, error, stop),
        Err(e) => {
            warn!("Failed to copy original {:?}: {}", job.source, e);
            FileReport::failed(job.relative.clone(), error)
        }
    }
}

/// Keep the original after `error` and report the failure, or an
/// interruption if a stop came in before the copy landed.
fn fall_back(job: &FileJob, original: &[u8], error: Error, stop: &AtomicBool) -> FileReport {
    match keep_original(job, original, stop) {
        Ok(false) => return FileReport::interrupted(job.relative.clone()),
        Ok(true) => {}
        Err(copy_err) => warn!("Failed to copy original {:?}: {}", job.source, copy_err),
    }
    FileReport::failed(job.relative.clone(), error)
}

/// Make sure the untouched original is at the destination.
///
/// Returns `Ok(false)` if a stop was requested before the copy was
/// committed.
fn keep_original(job: &FileJob, original: &[u8], stop: &AtomicBool) -> Result<bool> {
    if job.is_in_place() {
        return Ok(true);
    }
    commit(job, original, stop)
}

/// Write `data` to a temporary sibling of the destination and rename it into
/// place.
///
/// Returns `Ok(false)` without touching the destination if a stop was
/// requested before the rename; the temporary file is removed on drop.
fn commit(job: &FileJob, data: &[u8], stop: &AtomicBool) -> Result<bool> {
    let dest = &job.destination;
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;

    tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io(tmp.path(), e))?;

    // Temp files are created 0600; carry over the source's permissions
    if let Ok(meta) = fs::metadata(&job.source) {
        let _ = fs::set_permissions(tmp.path(), meta.permissions());
    }

    if stop.load(Ordering::SeqCst) {
        debug!("Stop requested, discarding {:?}", tmp.path());
        return Ok(false);
    }

    tmp.persist(dest).map_err(|e| Error::io(dest, e.error))?;
    Ok(true)
}
