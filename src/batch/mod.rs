//! Parallel batch processing.
//!
//! Files are fanned out to a rayon pool. Each worker reads, optimizes and
//! commits one file on its own, then sends a [`FileReport`] back over a
//! channel; the calling thread is the only one that touches the summary and
//! the progress callback.

mod report;
pub mod shutdown;
mod worker;

pub use report::{format_mb, BatchSummary, FileReport, FileStatus};
pub use worker::process_file;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use tracing::{debug, info};

use crate::transcode::TranscodeSettings;
use crate::{Error, Result};

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    /// File to read.
    pub source: PathBuf,
    /// Where the result goes; equal to `source` when rewriting in place.
    pub destination: PathBuf,
    /// Path relative to the input root, used for reporting.
    pub relative: PathBuf,
}

impl FileJob {
    pub fn is_in_place(&self) -> bool {
        self.source == self.destination
    }
}

/// Batch-wide settings.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub settings: TranscodeSettings,
    /// Worker count; defaults to the number of CPUs.
    pub workers: Option<usize>,
}

impl BatchOptions {
    /// Effective pool size for `jobs` files.
    pub fn worker_count(&self, jobs: usize) -> usize {
        self.workers
            .unwrap_or_else(num_cpus::get)
            .min(jobs)
            .max(1)
    }
}

/// Runs a set of [`FileJob`]s across a worker pool.
pub struct BatchRunner {
    options: BatchOptions,
    stop: Arc<AtomicBool>,
}

impl BatchRunner {
    /// Create a runner. Setting `stop` makes workers finish their current
    /// file without committing it and skip the rest.
    pub fn new(options: BatchOptions, stop: Arc<AtomicBool>) -> Self {
        Self { options, stop }
    }

    pub fn run(&self, jobs: Vec<FileJob>) -> Result<BatchSummary> {
        self.run_with_progress(jobs, |_, _, _| {})
    }

    /// Process every job, calling `progress(done, total, report)` on the
    /// calling thread as each file completes.
    pub fn run_with_progress<F>(&self, jobs: Vec<FileJob>, mut progress: F) -> Result<BatchSummary>
    where
        F: FnMut(usize, usize, &FileReport),
    {
        let total = jobs.len();
        let mut summary = BatchSummary::default();
        if total == 0 {
            return Ok(summary);
        }

        let workers = self.options.worker_count(total);
        info!("Processing {} files with {} workers", total, workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tileforged-worker-{}", i))
            .build()?;

        let (tx, rx) = mpsc::channel();
        for job in jobs {
            let tx = tx.clone();
            let settings = self.options.settings.clone();
            let stop = self.stop.clone();
            pool.spawn(move || {
                let report = panic::catch_unwind(AssertUnwindSafe(|| {
                    process_file(&job, &settings, &stop)
                }))
                .unwrap_or_else(|payload| {
                    worker::recover(&job, Error::Panicked(panic_message(&*payload)), &stop)
                });
                // Receiver only goes away if the orchestrator itself died
                let _ = tx.send(report);
            });
        }
        drop(tx);

        for report in rx {
            let done = summary.total() + 1;
            debug!("[{}/{}] {}", done, total, report);
            progress(done, total, &report);
            summary.record(report);
        }

        Ok(summary)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
