//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di compressione
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `software_crf`: CRF per libx265 (0-51, default: 28, più basso = migliore qualità)
//! - `software_preset`: Preset velocità x265 (default: "medium")
//! - `hardware_cq`: Constant quality per hevc_nvenc (0-51, default: 28)
//! - `threads`: Override numero thread CPU (default: None = core rilevati)
//! - `force_software`: Ignora l'hardware e usa sempre libx265 (default: false)
//! - `output_dir_name`: Nome della sottodirectory di output (default: "compressed")
//! - `single_file_prefix`: Prefisso applicato all'output in modalità file singolo
//!   per evitare collisioni col sorgente (default: "compressed_")
//!
//! ## Validazione:
//! - Controlla che software_crf e hardware_cq siano 0-51
//! - Controlla che il preset sia uno dei preset x265 conosciuti
//! - Controlla che output_dir_name non sia vuoto
//!
//! ## Esempio:
//! ```rust
//! use video_compressor::Config;
//!
//! let config = Config {
//!     software_crf: 24,
//!     force_software: true,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const X265_PRESETS: &[&str] = &[
    "ultrafast", "superfast", "veryfast", "faster", "fast", "medium", "slow", "slower",
    "veryslow", "placebo",
];

/// Configuration for video compression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// CRF value for the software (libx265) profile (0-51, lower = better quality)
    pub software_crf: u8,
    /// Speed preset for the software profile
    pub software_preset: String,
    /// Constant-quality target for the hardware (hevc_nvenc) profile (0-51)
    pub hardware_cq: u8,
    /// Thread count for software encoding (None = detected CPU core count)
    pub threads: Option<usize>,
    /// Skip hardware detection and always use the software profile
    pub force_software: bool,
    /// Name of the output subdirectory created beside the input
    pub output_dir_name: String,
    /// Prefix for the output filename in single-file mode
    pub single_file_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            software_crf: 28,
            software_preset: "medium".to_string(),
            hardware_cq: 28,
            threads: None,
            force_software: false,
            output_dir_name: "compressed".to_string(),
            single_file_prefix: "compressed_".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.software_crf > 51 {
            return Err(anyhow::anyhow!("Software CRF must be between 0 and 51"));
        }

        if self.hardware_cq > 51 {
            return Err(anyhow::anyhow!("Hardware CQ must be between 0 and 51"));
        }

        if !X265_PRESETS.contains(&self.software_preset.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown x265 preset: {}",
                self.software_preset
            ));
        }

        if let Some(threads) = self.threads {
            if threads == 0 {
                return Err(anyhow::anyhow!("Thread count must be greater than 0"));
            }
        }

        if self.output_dir_name.is_empty() {
            return Err(anyhow::anyhow!("Output directory name must not be empty"));
        }

        Ok(())
    }

    /// Effective thread count for the software encoder
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
