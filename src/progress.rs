//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di una run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Observer pluggabile per le righe di progress dell'encoder (canale
//!   best-effort e lossy: non influisce sulla correttezza)
//! - Tracking statistiche della run (file riusciti, falliti, byte risparmiati)
//! - Report finali con statistiche aggregate
//!
//! ## Componenti principali:
//! - `ProgressObserver`: Trait per consumare le righe di progress live
//! - `ProgressManager`: Progress bar principale ("file i of N")
//! - `RunStats`: Statistiche cumulative della run
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================>-------] 3/5 (60%) frame= 812 time=00:00:27.04 speed=1.2x
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::file_manager::FileManager;

/// Consumes live progress lines emitted by the encoder process.
///
/// Implementations must tolerate bursts and may drop lines; the channel
/// carries display information only.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, line: &str);
}

/// Observer that discards every progress line
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _line: &str) {}
}

/// Manages the per-batch progress bar
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager for `total_files` work items
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance to the next work item with a message
    pub fn next_item(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a custom message without advancing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl ProgressObserver for ProgressManager {
    fn on_progress(&self, line: &str) {
        self.bar.set_message(line.trim().to_string());
    }
}

/// Statistics tracker for one batch run
#[derive(Debug, Default)]
pub struct RunStats {
    pub files_processed: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub cancelled: bool,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, input_bytes: u64, output_bytes: u64) {
        self.files_processed += 1;
        self.files_succeeded += 1;
        self.total_input_bytes += input_bytes;
        self.total_output_bytes += output_bytes;
    }

    pub fn add_failure(&mut self) {
        self.files_processed += 1;
        self.files_failed += 1;
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_input_bytes
            .saturating_sub(self.total_output_bytes)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_input_bytes > 0 {
            (self.bytes_saved() as f64 / self.total_input_bytes as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Processed: {} files | Succeeded: {} | Failed: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_succeeded,
            self.files_failed,
            FileManager::format_size(self.bytes_saved()),
            self.overall_reduction_percent()
        );
        if self.cancelled {
            summary.push_str(" | Cancelled");
        }
        summary
    }
}
