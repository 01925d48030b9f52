//! # Encoder Command Synthesis Module
//!
//! Questo modulo costruisce l'invocazione ffmpeg completa per un WorkItem.
//!
//! ## Responsabilità:
//! - Mappa i gradi di rotazione sul filtro `transpose` corrispondente
//! - Forza sempre il tag di rotazione dell'output a 0, così i player non
//!   riapplicano una rotazione già corretta a livello di pixel
//! - Seleziona il profilo encoder hardware (hevc_nvenc) o software (libx265)
//!   in base al CapabilityProfile
//! - Propaga tutti i metadata del container e copia audio/sottotitoli
//!
//! ## Mapping rotazione → filtro:
//! | gradi        | filtro                     |
//! |--------------|----------------------------|
//! | 90           | transpose=1                |
//! | 270 / -90    | transpose=2                |
//! | 180 / -180   | transpose=1,transpose=1    |
//! | altro        | nessun filtro              |
//!
//! La sintesi è una funzione pura dei suoi input: stessi input, stessa
//! sequenza di argomenti.

use crate::capability::CapabilityProfile;
use crate::compressor::WorkItem;
use crate::config::Config;
use crate::probe::RotationMetadata;
use crate::{args, platform::PlatformCommands};
use std::path::PathBuf;

const X265_PARAMS: &str =
    "aq-mode=3:aq-strength=1:psy-rd=1.0:deblock=1,1:sao=1:strong-intra-smoothing=1";

/// Fully materialized external encoder invocation for one WorkItem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCommand {
    pub program: String,
    pub args: Vec<String>,
    pub destination: PathBuf,
}

/// Geometric transform for a rotation tag, if any
fn rotation_filter(rotation: RotationMetadata) -> Option<&'static str> {
    match rotation.degrees {
        90 => Some("transpose=1"),
        270 | -90 => Some("transpose=2"),
        180 | -180 => Some("transpose=1,transpose=1"),
        _ => None,
    }
}

/// Build the complete encoder invocation for one work item
pub fn synthesize(
    item: &WorkItem,
    capability: CapabilityProfile,
    rotation: RotationMetadata,
    config: &Config,
) -> EncodeCommand {
    let platform = PlatformCommands::instance();

    let mut cmd_args = args![
        "-y",
        "-i",
        item.source.display(),
        "-map_metadata",
        "0",
        "-map",
        "0",
    ];

    if let Some(filter) = rotation_filter(rotation) {
        cmd_args.extend(args!["-vf", filter]);
    }
    // Always zero the output rotation tag, even when no transform was
    // applied, so players never double-apply rotation
    cmd_args.extend(args!["-metadata:s:v:0", "rotate=0"]);

    if capability.hardware_accel_available {
        cmd_args.extend(args![
            "-c:v",
            "hevc_nvenc",
            "-preset",
            "p7",
            "-rc:v",
            "vbr",
            "-cq:v",
            config.hardware_cq,
            "-b:v",
            "0",
            "-spatial-aq",
            "1",
            "-aq-strength",
            "15",
        ]);
    } else {
        cmd_args.extend(args![
            "-c:v",
            "libx265",
            "-preset",
            config.software_preset,
            "-crf",
            config.software_crf,
            "-x265-params",
            X265_PARAMS,
        ]);
    }

    cmd_args.extend(args!["-c:a", "copy", "-c:s", "copy", "-thread_queue_size", "4096"]);

    if !capability.hardware_accel_available {
        cmd_args.extend(args!["-threads", config.effective_threads()]);
    }

    cmd_args.push(item.destination.display().to_string());

    EncodeCommand {
        program: platform.get_command("ffmpeg").to_string(),
        args: cmd_args,
        destination: item.destination.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn item() -> WorkItem {
        WorkItem {
            source: Path::new("/videos/clip.mp4").to_path_buf(),
            destination: Path::new("/videos/compressed/clip.mp4").to_path_buf(),
        }
    }

    fn config() -> Config {
        Config {
            threads: Some(4),
            ..Default::default()
        }
    }

    fn joined(cmd: &EncodeCommand) -> String {
        cmd.args.join(" ")
    }

    #[test]
    fn test_rotation_filter_table() {
        let cases = [
            (90, Some("transpose=1")),
            (270, Some("transpose=2")),
            (-90, Some("transpose=2")),
            (180, Some("transpose=1,transpose=1")),
            (-180, Some("transpose=1,transpose=1")),
            (0, None),
            (45, None),
        ];
        for (degrees, expected) in cases {
            assert_eq!(
                rotation_filter(RotationMetadata::new(degrees)),
                expected,
                "degrees = {}",
                degrees
            );
        }
    }

    #[test]
    fn test_rotation_tag_always_forced_to_zero() {
        for degrees in [0, 90, 180, 270, -90, -180, 12345] {
            let cmd = synthesize(
                &item(),
                CapabilityProfile::software_only(),
                RotationMetadata::new(degrees),
                &config(),
            );
            let pos = cmd
                .args
                .iter()
                .position(|a| a == "-metadata:s:v:0")
                .expect("rotation tag override missing");
            assert_eq!(cmd.args[pos + 1], "rotate=0", "degrees = {}", degrees);
        }
    }

    #[test]
    fn test_no_filter_without_rotation() {
        let cmd = synthesize(
            &item(),
            CapabilityProfile::software_only(),
            RotationMetadata::NONE,
            &config(),
        );
        assert!(!cmd.args.iter().any(|a| a == "-vf"));
    }

    #[test]
    fn test_quarter_turn_filter_applied() {
        let cmd = synthesize(
            &item(),
            CapabilityProfile::hardware(),
            RotationMetadata::new(90),
            &config(),
        );
        let pos = cmd.args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(cmd.args[pos + 1], "transpose=1");
    }

    #[test]
    fn test_encoder_profile_exclusivity() {
        let hw = synthesize(
            &item(),
            CapabilityProfile::hardware(),
            RotationMetadata::NONE,
            &config(),
        );
        assert!(joined(&hw).contains("hevc_nvenc"));
        assert!(joined(&hw).contains("-cq:v 28"));
        assert!(joined(&hw).contains("-spatial-aq 1"));
        assert!(!joined(&hw).contains("libx265"));
        assert!(!joined(&hw).contains("-crf"));

        let sw = synthesize(
            &item(),
            CapabilityProfile::software_only(),
            RotationMetadata::NONE,
            &config(),
        );
        assert!(joined(&sw).contains("libx265"));
        assert!(joined(&sw).contains("-preset medium"));
        assert!(joined(&sw).contains("-crf 28"));
        assert!(joined(&sw).contains("-threads 4"));
        assert!(joined(&sw).contains(X265_PARAMS));
        assert!(!joined(&sw).contains("hevc_nvenc"));
    }

    #[test]
    fn test_common_directives() {
        for capability in [
            CapabilityProfile::hardware(),
            CapabilityProfile::software_only(),
        ] {
            let cmd = synthesize(&item(), capability, RotationMetadata::NONE, &config());
            let text = joined(&cmd);
            assert_eq!(cmd.args[0], "-y", "overwrite must always be forced");
            assert!(text.contains("-map_metadata 0"));
            assert!(text.contains("-map 0"));
            assert!(text.contains("-c:a copy"));
            assert!(text.contains("-c:s copy"));
            assert!(text.contains("-thread_queue_size 4096"));
            assert_eq!(
                cmd.args.last().unwrap(),
                "/videos/compressed/clip.mp4",
                "destination must be the final argument"
            );
        }
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let a = synthesize(
            &item(),
            CapabilityProfile::hardware(),
            RotationMetadata::new(270),
            &config(),
        );
        let b = synthesize(
            &item(),
            CapabilityProfile::hardware(),
            RotationMetadata::new(270),
            &config(),
        );
        assert_eq!(a, b);
    }
}
