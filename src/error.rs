//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `UnsupportedInput`: Path esistente ma estensione non riconosciuta
//! - `NoInputFound`: Directory senza file video supportati
//! - `InvalidInput`: Path che non è né file né directory
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Validation`: Errori di validazione configurazione
//!
//! Nota: l'assenza di rotazione nei metadata e l'assenza di accelerazione
//! hardware NON sono errori, vengono recuperate localmente dai rispettivi
//! moduli. Un encode fallito o cancellato non è un errore ma un esito
//! (`EncodeOutcome::Failed` / `Cancelled`) e risale al chiamante come tale.

use std::path::PathBuf;

/// Custom error types for video compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a supported video file (MKV, MP4, MOV)")]
    UnsupportedInput(PathBuf),

    #[error("no video files (MKV, MP4, MOV) found in {0}")]
    NoInputFound(PathBuf),

    #[error("{0} is not a valid file or directory")]
    InvalidInput(PathBuf),

    #[error("dependency missing: {0}")]
    MissingDependency(String),

    #[error("configuration error: {0}")]
    Validation(String),
}
