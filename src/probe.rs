//! # Rotation Metadata Probe Module
//!
//! Questo modulo estrae i metadata di rotazione da un file video.
//!
//! ## Responsabilità:
//! - Invoca `ffprobe` sul primo video stream chiedendo solo il tag `rotate`
//! - Parsa il risultato testuale come intero (gradi)
//! - Qualunque fallimento (output vuoto, parse error, binario mancante)
//!   produce 0 gradi, mai un errore: l'assenza di rotazione è il caso comune
//!
//! ## Invocazione ffprobe:
//! ```text
//! ffprobe -v error -select_streams v:0 \
//!         -show_entries stream_tags=rotate \
//!         -of default=noprint_wrappers=1:nokey=1 <file>
//! ```

use crate::platform::PlatformCommands;
use std::path::Path;
use tracing::debug;

/// Orientation correction needed for a source file, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationMetadata {
    pub degrees: i32,
}

impl RotationMetadata {
    pub const NONE: Self = Self { degrees: 0 };

    pub fn new(degrees: i32) -> Self {
        Self { degrees }
    }
}

/// Parse ffprobe's single-line rotation output. Empty or unparseable
/// output means no rotation.
pub fn parse_rotation(output: &str) -> RotationMetadata {
    match output.trim().parse::<i32>() {
        Ok(degrees) => RotationMetadata { degrees },
        Err(_) => RotationMetadata::NONE,
    }
}

/// Probe the rotation tag of the first video stream of a file
pub async fn probe_rotation(source: &Path) -> RotationMetadata {
    let platform = PlatformCommands::instance();

    let result = tokio::process::Command::new(platform.get_command("ffprobe"))
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream_tags=rotate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(source)
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            parse_rotation(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            debug!(
                "ffprobe exited with {} for {}, assuming no rotation",
                output.status,
                source.display()
            );
            RotationMetadata::NONE
        }
        Err(e) => {
            debug!(
                "ffprobe not invocable for {}: {}, assuming no rotation",
                source.display(),
                e
            );
            RotationMetadata::NONE
        }
    }
}
