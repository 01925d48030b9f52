//! # Process Supervision Module
//!
//! Questo modulo è la macchina a stati centrale del sistema: lancia il
//! processo encoder esterno, ne legge il progress riga per riga e applica
//! la semantica di cleanup su fallimento e cancellazione.
//!
//! ## Stati:
//! `Starting → Running → {Succeeded, Failed, Cancelled}`
//!
//! - La transizione `Starting → Running` avviene allo spawn del processo
//! - Mentre è `Running`, lo stderr viene letto riga per riga: le righe che
//!   contengono `frame=`, `time=` o `speed=` vengono inoltrate
//!   all'observer, le altre finiscono in una coda diagnostica bounded
//! - Exit code 0 → `Succeeded` con dimensione output e tempo trascorso
//! - Exit code non-zero → `Failed` con exit code e testo diagnostico;
//!   il file di output parziale viene lasciato su disco per ispezione
//! - Cancellazione → `Cancelled`: il child viene terminato e il file di
//!   output rimosso; un fallimento nella rimozione è solo un warning
//!
//! Nessun retry a questo livello: l'esito risale al Batch Coordinator.
//! Nessun timeout: un encode può durare arbitrariamente a lungo.

use crate::command::EncodeCommand;
use crate::error::CompressError;
use crate::progress::ProgressObserver;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Lines of non-progress stderr retained for the failure diagnostic
const DIAGNOSTIC_TAIL_LINES: usize = 40;

/// Terminal result of one encode attempt
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOutcome {
    Success {
        output_size_bytes: u64,
        elapsed_seconds: f64,
    },
    Failed {
        exit_code: i32,
        diagnostic_text: String,
    },
    Cancelled,
}

/// Cooperative cancellation signal, checked at every read-line
/// suspension point of the supervisor.
#[derive(Debug, Default)]
pub struct CancelSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register with the Notify before re-checking the flag, so a
        // concurrent cancel() landing between the check and the first
        // poll is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Is this stderr line a live progress indicator?
fn is_progress_line(line: &str) -> bool {
    line.contains("frame=") || line.contains("time=") || line.contains("speed=")
}

/// Supervises a single external encoder invocation
pub struct ProcessSupervisor;

impl ProcessSupervisor {
    /// Run the encoder to completion, forwarding progress lines to the
    /// observer. Returns the terminal outcome; `Err` is reserved for
    /// infrastructure failures (encoder binary missing, pipe errors).
    pub async fn run(
        command: &EncodeCommand,
        cancel: &CancelSignal,
        observer: &dyn ProgressObserver,
    ) -> Result<EncodeOutcome, CompressError> {
        let start = Instant::now();

        debug!("spawning encoder: {} {}", command.program, command.args.join(" "));
        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompressError::MissingDependency(command.program.clone())
                } else {
                    CompressError::Io(e)
                }
            })?;
        debug!("encoder spawned, supervisor running");

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CompressError::Validation("encoder stderr not captured".into()))?;
        let mut lines = BufReader::new(stderr).lines();
        let mut diagnostic_tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL_LINES);

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if is_progress_line(&line) {
                            observer.on_progress(&line);
                        } else if !line.trim().is_empty() {
                            if diagnostic_tail.len() == DIAGNOSTIC_TAIL_LINES {
                                diagnostic_tail.pop_front();
                            }
                            diagnostic_tail.push_back(line);
                        }
                    }
                    // Encoder closed its stderr: it is exiting
                    None => break,
                },
                _ = cancel.cancelled() => {
                    return Self::finalize_cancelled(&mut child, command).await;
                }
            }
        }

        // The child may close stderr long before exiting; cancellation
        // must stay deliverable while waiting for it
        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                return Self::finalize_cancelled(&mut child, command).await;
            }
        };

        if status.success() {
            let output_size_bytes = tokio::fs::metadata(&command.destination).await?.len();
            Ok(EncodeOutcome::Success {
                output_size_bytes,
                elapsed_seconds: start.elapsed().as_secs_f64(),
            })
        } else {
            // The partial output file is intentionally left on disk so it
            // can be inspected, unlike the cancellation path
            Ok(EncodeOutcome::Failed {
                exit_code: status.code().unwrap_or(-1),
                diagnostic_text: diagnostic_tail.into_iter().collect::<Vec<_>>().join("\n"),
            })
        }
    }

    /// Terminate the child and remove the partial destination file
    async fn finalize_cancelled(
        child: &mut tokio::process::Child,
        command: &EncodeCommand,
    ) -> Result<EncodeOutcome, CompressError> {
        debug!("cancellation requested, terminating encoder");
        if let Err(e) = child.kill().await {
            warn!("failed to terminate encoder process: {}", e);
        }

        if command.destination.exists() {
            match tokio::fs::remove_file(&command.destination).await {
                Ok(()) => debug!(
                    "partially compressed file removed: {}",
                    command.destination.display()
                ),
                Err(e) => warn!(
                    "could not remove partial output file {}: {}",
                    command.destination.display(),
                    e
                ),
            }
        }

        Ok(EncodeOutcome::Cancelled)
    }
}
