//! # Hardware Capability Detection Module
//!
//! Questo modulo determina se è disponibile l'encoding hardware-accelerato.
//!
//! ## Responsabilità:
//! - Invoca `nvidia-smi` come diagnostica hardware
//! - Tratta qualunque fallimento (exit non-zero, binario mancante) come
//!   "accelerazione non disponibile", mai come errore
//! - Espone una variante `Fixed` iniettabile per i test, che non tocca
//!   l'hardware reale
//!
//! L'assenza di una GPU è un esito normale e atteso: il chiamante riceve
//! sempre un `CapabilityProfile`, mai un `Result`.

use crate::platform::PlatformCommands;
use tracing::debug;

/// Whether hardware-accelerated encoding can be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProfile {
    pub hardware_accel_available: bool,
}

impl CapabilityProfile {
    pub fn hardware() -> Self {
        Self {
            hardware_accel_available: true,
        }
    }

    pub fn software_only() -> Self {
        Self {
            hardware_accel_available: false,
        }
    }
}

/// Detects encoding capability.
///
/// `NvidiaSmi` runs the real diagnostic; `Fixed` returns a canned profile
/// so tests never invoke hardware diagnostics.
#[derive(Debug, Clone)]
pub enum CapabilityDetector {
    NvidiaSmi,
    Fixed(CapabilityProfile),
}

impl CapabilityDetector {
    pub async fn detect(&self) -> CapabilityProfile {
        match self {
            Self::Fixed(profile) => *profile,
            Self::NvidiaSmi => {
                let platform = PlatformCommands::instance();
                let result = tokio::process::Command::new(platform.get_command("nvidia-smi"))
                    .output()
                    .await;

                let available = match result {
                    Ok(output) => output.status.success(),
                    Err(e) => {
                        debug!("nvidia-smi not invocable: {}", e);
                        false
                    }
                };

                CapabilityProfile {
                    hardware_accel_available: available,
                }
            }
        }
    }
}
