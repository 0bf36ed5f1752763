//! Per-file results and batch totals.

use std::path::PathBuf;

use crate::optimize::PassReason;
use crate::Error;

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileStatus {
    /// A rebuilt tile was written.
    Optimized {
        /// Number of images that shrank.
        images: usize,
    },
    /// Nothing to do; the original was kept.
    PassedThrough(PassReason),
    /// Processing failed; the original was kept.
    Failed(Error),
    /// Stopped by a termination signal before anything was committed.
    Interrupted,
}

/// Outcome of processing one file.
#[derive(Debug)]
pub struct FileReport {
    /// Path relative to the input root.
    pub path: PathBuf,
    /// Size of the input in bytes (0 unless optimized).
    pub original_size: u64,
    /// Size of the output in bytes (0 unless optimized).
    pub new_size: u64,
    pub status: FileStatus,
}

impl FileReport {
    pub fn optimized(path: PathBuf, original_size: u64, new_size: u64, images: usize) -> Self {
        Self {
            path,
            original_size,
            new_size,
            status: FileStatus::Optimized { images },
        }
    }

    pub fn passed_through(path: PathBuf, reason: PassReason) -> Self {
        Self::without_sizes(path, FileStatus::PassedThrough(reason))
    }

    pub fn failed(path: PathBuf, error: Error) -> Self {
        Self::without_sizes(path, FileStatus::Failed(error))
    }

    pub fn interrupted(path: PathBuf) -> Self {
        Self::without_sizes(path, FileStatus::Interrupted)
    }

    fn without_sizes(path: PathBuf, status: FileStatus) -> Self {
        Self {
            path,
            original_size: 0,
            new_size: 0,
            status,
        }
    }

    pub fn is_optimized(&self) -> bool {
        matches!(self.status, FileStatus::Optimized { .. })
    }

    /// Human-readable status.
    pub fn status_text(&self) -> String {
        match &self.status {
            FileStatus::Optimized { images } => format!("optimized ({} images)", images),
            FileStatus::PassedThrough(reason) => reason.to_string(),
            FileStatus::Failed(error) => format!("error: {}", error),
            FileStatus::Interrupted => "interrupted".to_string(),
        }
    }

    /// Percentage size reduction, if the file was optimized.
    pub fn reduction_percent(&self) -> Option<f64> {
        if self.is_optimized() && self.original_size > 0 {
            Some((1.0 - self.new_size as f64 / self.original_size as f64) * 100.0)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reduction_percent() {
            Some(reduction) => write!(
                f,
                "{}: {} → {} ({:.1}% reduction)",
                self.path.display(),
                format_mb(self.original_size),
                format_mb(self.new_size),
                reduction
            ),
            None => write!(f, "{}: {}", self.path.display(), self.status_text()),
        }
    }
}

/// Aggregate over a batch, accumulated on the orchestrator thread.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub optimized: usize,
    pub passed_through: usize,
    pub failed: usize,
    pub interrupted: usize,
    /// Total input size of optimized files.
    pub original_bytes: u64,
    /// Total output size of optimized files.
    pub new_bytes: u64,
    /// Reports in completion order.
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Optimized { .. } => {
                self.optimized += 1;
                self.original_bytes += report.original_size;
                self.new_bytes += report.new_size;
            }
            FileStatus::PassedThrough(_) => self.passed_through += 1,
            FileStatus::Failed(_) => self.failed += 1,
            FileStatus::Interrupted => self.interrupted += 1,
        }
        self.reports.push(report);
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn saved_bytes(&self) -> u64 {
        self.original_bytes.saturating_sub(self.new_bytes)
    }

    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            (1.0 - self.new_bytes as f64 / self.original_bytes as f64) * 100.0
        }
    }
}

/// Format a byte count as megabytes with one decimal.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / 1024.0 / 1024.0)
}
