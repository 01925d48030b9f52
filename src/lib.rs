//! # Video Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `platform`: Nomi comandi cross-platform e check disponibilità tool
//! - `capability`: Rilevamento accelerazione hardware (NVENC)
//! - `probe`: Estrazione metadata di rotazione con ffprobe
//! - `command`: Sintesi della command line ffmpeg completa
//! - `supervisor`: Supervisione processo encoder, progress e cancellazione
//! - `compressor`: Orchestratore batch (file singolo o directory)
//! - `file_manager`: Operazioni sui file e discovery video
//! - `progress`: Progress tracking e statistiche
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use video_compressor::{BatchCompressor, CancelSignal, Config};
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::default();
//! let compressor = BatchCompressor::new(config);
//! let cancel = CancelSignal::new();
//! let report = compressor.run("/path/to/videos".as_ref(), &cancel).await?;
//! # Ok(()) }
//! ```

pub mod capability;
pub mod command;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod platform;
pub mod probe;
pub mod progress;
pub mod supervisor;
pub mod utils;

pub use capability::{CapabilityDetector, CapabilityProfile};
pub use command::EncodeCommand;
pub use compressor::{BatchCompressor, BatchReport, EncoderBackend, WorkItem};
pub use config::Config;
pub use error::CompressError;
pub use probe::RotationMetadata;
pub use supervisor::{CancelSignal, EncodeOutcome, ProcessSupervisor};
