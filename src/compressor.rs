//! # Batch Coordinator Module
//!
//! Questo è il modulo che orchestra l'intero processo di compressione.
//!
//! ## Responsabilità:
//! - Risolve l'input (file singolo o directory) in una lista ordinata di WorkItem
//! - Verifica le dipendenze esterne prima dell'avvio (ffmpeg, ffprobe)
//! - Rileva la capability hardware una sola volta per run
//! - Processa gli item strettamente in sequenza: un solo encoder attivo
//!   alla volta, nessun overlap tra item
//! - Report per-item (dimensioni, ratio di compressione, tempo) e aggregato
//!
//! ## Regole di risoluzione:
//! - File singolo: l'estensione deve essere nell'allow-list (MKV, MP4, MOV),
//!   altrimenti `UnsupportedInput`; l'output va in `<parent>/compressed/`
//!   con prefisso `compressed_` per non collidere col sorgente
//! - Directory: scan non ricorsivo dei figli diretti; nessun match →
//!   `NoInputFound`; l'output va in `<dir>/compressed/` con lo stesso nome
//!
//! ## Politica di cancellazione:
//! Un esito `Cancelled` ferma l'intera coda rimanente (non solo l'item
//! corrente): l'interruzione arriva dall'utente e proseguire sarebbe una
//! sorpresa. Un esito `Failed` invece non ferma il batch.
//!
//! ## Esempio:
//! ```rust,no_run
//! use video_compressor::{BatchCompressor, CancelSignal, Config};
//! # async fn demo() -> anyhow::Result<()> {
//! let compressor = BatchCompressor::new(Config::default());
//! let cancel = CancelSignal::new();
//! let report = compressor.run("/videos".as_ref(), &cancel).await?;
//! println!("{}", report.stats.format_summary());
//! # Ok(()) }
//! ```

use crate::capability::{CapabilityDetector, CapabilityProfile};
use crate::command::{self, EncodeCommand};
use crate::config::Config;
use crate::error::CompressError;
use crate::file_manager::FileManager;
use crate::platform::PlatformCommands;
use crate::probe;
use crate::progress::{ProgressManager, RunStats};
use crate::supervisor::{CancelSignal, EncodeOutcome, ProcessSupervisor};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const MB: f64 = 1024.0 * 1024.0;

/// One source → destination pairing to be transcoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Aggregate result of one batch run
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<(WorkItem, EncodeOutcome)>,
    pub stats: RunStats,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        !self.stats.cancelled && self.stats.files_failed == 0
    }

    /// Process exit code for this run: 0 when every item succeeded,
    /// 1 when any item failed or the run was cancelled
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }
}

/// How the per-item encoder invocation is produced.
///
/// `Ffmpeg` synthesizes the real command; `Script` runs a caller-supplied
/// shell script (destination as `$1`, source as `$2`) so the batch
/// pipeline can be exercised without an encoder installed, the same way
/// `CapabilityDetector::Fixed` stands in for the hardware probe.
#[derive(Debug, Clone)]
pub enum EncoderBackend {
    Ffmpeg,
    Script(String),
}

/// Main batch compression orchestrator
pub struct BatchCompressor {
    config: Config,
    detector: CapabilityDetector,
    backend: EncoderBackend,
}

impl BatchCompressor {
    /// Create a compressor with real hardware detection (unless the
    /// configuration forces the software profile)
    pub fn new(config: Config) -> Self {
        let detector = if config.force_software {
            CapabilityDetector::Fixed(CapabilityProfile::software_only())
        } else {
            CapabilityDetector::NvidiaSmi
        };
        Self {
            config,
            detector,
            backend: EncoderBackend::Ffmpeg,
        }
    }

    /// Create a compressor with an injected capability detector
    pub fn with_detector(config: Config, detector: CapabilityDetector) -> Self {
        Self {
            config,
            detector,
            backend: EncoderBackend::Ffmpeg,
        }
    }

    /// Replace the encoder backend (used to substitute a stub encoder)
    pub fn with_backend(mut self, backend: EncoderBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Resolve a user-supplied path into the ordered work-item list
    pub fn resolve_work_items(&self, input: &Path) -> Result<Vec<WorkItem>, CompressError> {
        if !input.exists() {
            return Err(CompressError::InvalidInput(input.to_path_buf()));
        }
        let input = input
            .canonicalize()
            .unwrap_or_else(|_| input.to_path_buf());

        if input.is_file() {
            if !FileManager::is_supported_video(&input) {
                return Err(CompressError::UnsupportedInput(input));
            }

            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            let output_dir = parent.join(&self.config.output_dir_name);
            let file_name = input
                .file_name()
                .ok_or_else(|| CompressError::InvalidInput(input.clone()))?
                .to_string_lossy()
                .to_string();
            let destination =
                output_dir.join(format!("{}{}", self.config.single_file_prefix, file_name));

            Ok(vec![WorkItem {
                source: input,
                destination,
            }])
        } else if input.is_dir() {
            let files = FileManager::find_video_files(&input);
            if files.is_empty() {
                return Err(CompressError::NoInputFound(input));
            }

            let output_dir = input.join(&self.config.output_dir_name);
            Ok(files
                .into_iter()
                .map(|source| {
                    let destination = output_dir.join(source.file_name().unwrap_or_default());
                    WorkItem {
                        source,
                        destination,
                    }
                })
                .collect())
        } else {
            Err(CompressError::InvalidInput(input))
        }
    }

    /// Process every resolved work item strictly in order
    pub async fn run(
        &self,
        input: &Path,
        cancel: &CancelSignal,
    ) -> Result<BatchReport, CompressError> {
        info!("Processing path: {}", input.display());

        if matches!(self.backend, EncoderBackend::Ffmpeg) {
            self.check_dependencies().await?;
        }
        let items = self.resolve_work_items(input)?;

        // One destination directory per run, created lazily before the
        // first encode writes into it
        if let Some(output_dir) = items[0].destination.parent() {
            tokio::fs::create_dir_all(output_dir).await?;
        }

        // Hardware does not change mid-batch, so detect once per run
        let capability = self.detector.detect().await;
        if capability.hardware_accel_available {
            info!("🖥️ NVIDIA GPU detected, using hardware acceleration");
        } else {
            info!("🧮 No NVIDIA GPU detected, using CPU encoding with optimized settings");
        }

        let total = items.len();
        let progress = ProgressManager::new(total as u64);
        let mut stats = RunStats::new();
        let mut results = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            let file_name = item.source.file_name().unwrap_or_default().to_string_lossy();
            info!("Processing file {} of {}", index + 1, total);
            progress.next_item(&file_name);

            let input_size = FileManager::file_size(&item.source).await?;
            info!("📥 Input file size: {:.2} MB", input_size as f64 / MB);
            info!("🎬 Starting compression of: {}", file_name);

            let encode_command = match &self.backend {
                EncoderBackend::Ffmpeg => {
                    let rotation = probe::probe_rotation(&item.source).await;
                    command::synthesize(&item, capability, rotation, &self.config)
                }
                EncoderBackend::Script(script) => EncodeCommand {
                    program: "sh".to_string(),
                    args: vec![
                        "-c".to_string(),
                        script.clone(),
                        "encoder-stub".to_string(),
                        item.destination.display().to_string(),
                        item.source.display().to_string(),
                    ],
                    destination: item.destination.clone(),
                },
            };
            let outcome = ProcessSupervisor::run(&encode_command, cancel, &progress).await?;

            match &outcome {
                EncodeOutcome::Success {
                    output_size_bytes,
                    elapsed_seconds,
                } => {
                    info!("✅ Compression completed successfully!");
                    info!("📤 Output file size: {:.2} MB", *output_size_bytes as f64 / MB);
                    info!(
                        "📉 Compression ratio: {:.1}%",
                        FileManager::calculate_reduction(input_size, *output_size_bytes)
                    );
                    info!("⏱️ Time taken: {:.1} minutes", elapsed_seconds / 60.0);
                    info!("💾 Output saved to: {}", item.destination.display());
                    stats.add_success(input_size, *output_size_bytes);
                }
                EncodeOutcome::Failed {
                    exit_code,
                    diagnostic_text,
                } => {
                    error!(
                        "❌ FFmpeg process failed with return code {} for {}",
                        exit_code, file_name
                    );
                    if !diagnostic_text.is_empty() {
                        error!("Error details: {}", diagnostic_text);
                    }
                    stats.add_failure();
                }
                EncodeOutcome::Cancelled => {
                    warn!("🛑 Compression cancelled by user");
                    stats.mark_cancelled();
                }
            }

            let halt = matches!(outcome, EncodeOutcome::Cancelled);
            results.push((item, outcome));
            if halt {
                // Halt the remaining queue: the interrupt came from the
                // user, not from this one file
                break;
            }
        }

        progress.finish(&stats.format_summary());
        info!("{}", stats.format_summary());

        Ok(BatchReport { results, stats })
    }

    /// Check that the required external tools are available
    async fn check_dependencies(&self) -> Result<(), CompressError> {
        let platform = PlatformCommands::instance();

        for tool in ["ffmpeg", "ffprobe"] {
            if !platform.is_command_available(tool).await {
                return Err(CompressError::MissingDependency(format!(
                    "{} is required for video compression",
                    tool
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compressor() -> BatchCompressor {
        BatchCompressor::with_detector(
            Config::default(),
            CapabilityDetector::Fixed(CapabilityProfile::software_only()),
        )
    }

    #[test]
    fn test_single_file_resolution_prefixes_output() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("clip.mp4");
        std::fs::write(&source, b"x").unwrap();

        let items = compressor().resolve_work_items(&source).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].destination.file_name().unwrap().to_string_lossy(),
            "compressed_clip.mp4"
        );
        assert_eq!(
            items[0].destination.parent().unwrap().file_name().unwrap(),
            "compressed"
        );
    }

    #[test]
    fn test_single_file_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, b"x").unwrap();

        let err = compressor().resolve_work_items(&source).unwrap_err();
        assert!(matches!(err, CompressError::UnsupportedInput(_)));
    }

    #[test]
    fn test_directory_resolution_filters_allow_list() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.mp4", "b.txt", "c.mkv", "d.png", "e.mov"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let items = compressor().resolve_work_items(temp_dir.path()).unwrap();
        let sources: Vec<_> = items
            .iter()
            .map(|i| i.source.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(sources, vec!["a.mp4", "c.mkv", "e.mov"]);
        // Directory items keep their filename, no prefix
        for item in &items {
            assert_eq!(
                item.source.file_name().unwrap(),
                item.destination.file_name().unwrap()
            );
            assert_eq!(
                item.destination.parent().unwrap().file_name().unwrap(),
                "compressed"
            );
        }
    }

    #[test]
    fn test_empty_directory_is_no_input_found() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("readme.md"), b"x").unwrap();

        let err = compressor().resolve_work_items(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CompressError::NoInputFound(_)));
    }

    #[test]
    fn test_missing_path_is_invalid_input() {
        let err = compressor()
            .resolve_work_items(Path::new("/definitely/not/there"))
            .unwrap_err();
        assert!(matches!(err, CompressError::InvalidInput(_)));
    }

    fn stub_compressor(script: &str) -> BatchCompressor {
        compressor().with_backend(EncoderBackend::Script(script.to_string()))
    }

    #[tokio::test]
    async fn test_run_end_to_end_with_stub_encoder() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.mp4"), b"source-bytes").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), b"not a video").unwrap();

        // Stub encoder: writes a fabricated 10-byte output and emits one
        // progress line
        let compressor = stub_compressor(
            "printf fabricated > \"$1\"; echo 'frame=  1 time=00:00:01.00 speed=1x' 1>&2",
        );
        let cancel = CancelSignal::new();

        let report = compressor.run(temp_dir.path(), &cancel).await.unwrap();

        assert_eq!(report.results.len(), 1, "only a.mp4 is eligible");
        let (item, outcome) = &report.results[0];
        assert_eq!(item.source.file_name().unwrap(), "a.mp4");
        match outcome {
            EncodeOutcome::Success {
                output_size_bytes, ..
            } => assert_eq!(*output_size_bytes, 10),
            other => panic!("expected success, got {:?}", other),
        }
        assert!(item.destination.exists());
        assert!(report.all_succeeded());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_run_continues_past_failed_items() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.mp4"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("b.mkv"), b"x").unwrap();

        let compressor = stub_compressor("echo 'unsupported codec' 1>&2; exit 1");
        let cancel = CancelSignal::new();

        let report = compressor.run(temp_dir.path(), &cancel).await.unwrap();

        // A failed item must not stop the batch
        assert_eq!(report.results.len(), 2);
        for (_, outcome) in &report.results {
            assert!(matches!(outcome, EncodeOutcome::Failed { exit_code: 1, .. }));
        }
        assert_eq!(report.stats.files_failed, 2);
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_run_halts_queue_after_cancellation() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let compressor = stub_compressor("printf partial > \"$1\"; sleep 30");
        let cancel = CancelSignal::new();
        cancel.cancel();

        let report = compressor.run(temp_dir.path(), &cancel).await.unwrap();

        // The cancelled item terminates the run; the rest of the queue is
        // never processed
        assert_eq!(report.results.len(), 1);
        assert!(report.results.len() < 3);
        assert!(matches!(report.results[0].1, EncodeOutcome::Cancelled));
        assert!(report.stats.cancelled);
        assert_eq!(report.exit_code(), 1);

        let output_dir = temp_dir.path().join("compressed");
        for name in ["a.mp4", "b.mp4", "c.mp4"] {
            assert!(
                !output_dir.join(name).exists(),
                "{} must not exist after cancellation",
                name
            );
        }
    }

    #[test]
    fn test_exit_code_mapping() {
        let mut stats = RunStats::new();
        stats.add_success(100, 50);
        let report = BatchReport {
            results: Vec::new(),
            stats,
        };
        assert_eq!(report.exit_code(), 0);

        let mut stats = RunStats::new();
        stats.add_success(100, 50);
        stats.add_failure();
        let report = BatchReport {
            results: Vec::new(),
            stats,
        };
        assert_eq!(report.exit_code(), 1);

        let mut stats = RunStats::new();
        stats.mark_cancelled();
        let report = BatchReport {
            results: Vec::new(),
            stats,
        };
        assert_eq!(report.exit_code(), 1);
    }
}
