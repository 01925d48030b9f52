//! # Video Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Collegamento di Ctrl-C al segnale di cancellazione cooperativo
//! - Creazione della configurazione e avvio del batch compressor
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (path, crf, cq, threads, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Registra l'handler Ctrl-C che scatena la cancellazione
//! 4. Istanzia BatchCompressor e avvia la run
//!
//! ## Exit code:
//! - `0`: tutti i work item completati con successo
//! - `1`: almeno un item fallito, oppure run cancellata
//! - `2`: nessun input eleggibile (estensione non supportata, directory
//!   vuota, path inesistente), configurazione invalida o tool mancante
//!
//! ## Esempio di utilizzo:
//! ```bash
//! video-compressor /path/to/videos --crf 26 --verbose
//! video-compressor clip.mkv --force-software
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use video_compressor::{BatchCompressor, CancelSignal, Config};

#[derive(Parser)]
#[command(name = "video-compressor")]
#[command(about = "Batch-compress videos with hardware-aware HEVC encoding")]
struct Args {
    /// Video file or directory containing video files (MKV, MP4, MOV)
    path: PathBuf,

    /// CRF for software (libx265) encoding (0-51, lower = better quality)
    #[arg(long, default_value = "28")]
    crf: u8,

    /// Constant-quality target for hardware (hevc_nvenc) encoding (0-51)
    #[arg(long, default_value = "28")]
    cq: u8,

    /// x265 speed preset for software encoding
    #[arg(long, default_value = "medium")]
    preset: String,

    /// Thread count for software encoding (default: detected CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Skip hardware detection and always encode on the CPU
    #[arg(long)]
    force_software: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            2
        }
    };

    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let config = Config {
        software_crf: args.crf,
        software_preset: args.preset,
        hardware_cq: args.cq,
        threads: args.threads,
        force_software: args.force_software,
        ..Default::default()
    };
    config.validate()?;

    // Deliver Ctrl-C as a cooperative cancellation signal so the
    // supervisor can terminate the encoder and clean up its output
    let cancel = Arc::new(CancelSignal::new());
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let compressor = BatchCompressor::new(config);
    let report = compressor.run(&args.path, &cancel).await?;

    Ok(report.exit_code())
}
