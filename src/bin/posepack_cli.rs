//! PosePack CLI - Pack inspection tool
//!
//! Commands: convert, merge, compose
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when any pack failed to load

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use posepack_core::{
    compose, ContentStore, EngineConfig, FileSource, LoadReport, PackLoader, PlacementState,
    StaticProbe,
};

#[derive(Parser)]
#[command(name = "posepack-cli")]
#[command(about = "PosePack CLI - content pack resolution and pose composition", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to engine configuration (TOML)
    #[arg(short, long, default_value = "posepack.toml", global = true)]
    config: PathBuf,

    /// Image format the target runtime supports beyond the baseline
    #[arg(short, long = "format", global = true)]
    formats: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single pack document
    Convert {
        /// Pack document path
        pack: String,
    },

    /// Merge packs in order, later packs overriding earlier ones
    Merge {
        /// Pack document paths
        #[arg(required = true)]
        packs: Vec<String>,
    },

    /// Compose a character's draw list
    Compose {
        /// Pack document paths
        #[arg(required = true)]
        packs: Vec<String>,

        /// Character id
        #[arg(long)]
        character: String,

        /// JSON payload (PlacementState)
        #[arg(short, long)]
        placement: String,
    },
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

fn report_json(report: &LoadReport) -> serde_json::Value {
    serde_json::json!({
        "loaded": report.loaded,
        "failed": report
            .failed
            .iter()
            .map(|(location, e)| serde_json::json!({ "location": location, "error": e.to_string() }))
            .collect::<Vec<_>>(),
    })
}

fn exit_for(report: &LoadReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match EngineConfig::load_from(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let loader = PackLoader::new(
        &config,
        FileSource::default(),
        StaticProbe::new(cli.formats.iter().cloned()),
        config.capability_cache(),
    );

    match cli.command {
        Commands::Convert { pack } => match loader.load(&pack).await {
            Ok(converted) => {
                print_json(&serde_json::json!({ "success": true, "pack": converted }));
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                ExitCode::from(2)
            }
        },

        Commands::Merge { packs } => {
            let mut store = ContentStore::new();
            let report = loader.load_all(&mut store, &packs).await;
            let fingerprint = match store.fingerprint() {
                Ok(f) => f,
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            };

            print_json(&serde_json::json!({
                "success": report.is_success(),
                "report": report_json(&report),
                "fingerprint": fingerprint,
                "aggregate": store.current(),
            }));
            exit_for(&report)
        }

        Commands::Compose {
            packs,
            character,
            placement,
        } => {
            let placement: PlacementState = match serde_json::from_str(&placement) {
                Ok(p) => p,
                Err(e) => {
                    print_json(&serde_json::json!({
                        "success": false,
                        "error": format!("Invalid placement: {}", e),
                    }));
                    return ExitCode::FAILURE;
                }
            };

            let mut store = ContentStore::new();
            let report = loader.load_all(&mut store, &packs).await;

            let Some(definition) = store.character(&character) else {
                print_json(&serde_json::json!({
                    "success": false,
                    "report": report_json(&report),
                    "error": format!("Character not found: {}", character),
                }));
                return ExitCode::FAILURE;
            };

            let directives = compose(definition, &placement, &[]);
            print_json(&serde_json::json!({
                "success": report.is_success(),
                "report": report_json(&report),
                "drawList": directives,
            }));
            exit_for(&report)
        }
    }
}
