//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file e la discovery dei video.
//!
//! ## Responsabilità:
//! - Discovery non ricorsiva di file video in una directory
//! - Determinazione formato file tramite allow-list di estensioni
//! - Utilità per dimensioni file e formattazione human-readable
//!
//! ## Formati supportati:
//! - **Video**: MKV, MP4, MOV
//!
//! ## Operazioni sui file:
//! - `find_video_files()`: Trova i file video figli diretti di una directory
//! - `is_supported_video()`: Determina se l'estensione è nell'allow-list
//! - `file_size()`: Ottiene la dimensione in byte
//! - `format_size()`: Converte bytes in formato leggibile (KB, MB, GB)
//!
//! ## Esempio:
//! ```rust,no_run
//! use video_compressor::file_manager::FileManager;
//!
//! let files = FileManager::find_video_files("/path/to/videos".as_ref());
//! for file in files {
//!     assert!(FileManager::is_supported_video(&file));
//! }
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Get the size of a file in bytes
    pub async fn file_size(path: &Path) -> std::io::Result<u64> {
        let metadata = fs::metadata(path).await?;
        Ok(metadata.len())
    }

    /// Find all supported video files among the immediate children of a
    /// directory. The scan is not recursive and the result is in
    /// file-name order, so repeated runs discover items in the same order.
    /// Unreadable entries are skipped.
    pub fn find_video_files(dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if Self::is_supported_video(path) {
                files.push(path.to_path_buf());
            }
        }

        files
    }

    /// Check if a file has a supported video extension
    pub fn is_supported_video(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "mkv" | "mp4" | "mov")
        } else {
            false
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
