//! atrium CLI
//!
//! Usage:
//!   atrium replay <snapshot.json>...          Reconcile each file in turn, print events
//!   atrium export <snapshot.json>...          Reconcile all files, print the resulting graph
//!   atrium build <scene.json> <room>...       Build authored rooms, print them as a snapshot

use std::path::PathBuf;

use atrium_cli::{codec, CliConfig, FileSource};
use atrium_scene::{authored_snapshot, LoadOutcome, ReconcileOutcome, SceneContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!("atrium - Replay, build and export room snapshots");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  atrium replay <snapshot.json>...     Reconcile each file in turn and print events");
    eprintln!("  atrium export <snapshot.json>...     Reconcile all files and print the final graph");
    eprintln!("  atrium build <scene.json> <room>...  Build authored rooms and print a snapshot");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ATRIUM_LOG                   Log filter (default: atrium=info)");
    eprintln!("  ATRIUM_REMOVE_MISSING        Remove rooms a later file omits (default: true)");
    eprintln!("  ATRIUM_MATCH_FOOTPRINTS      Match re-scanned rooms by floor outline (default: false)");
    eprintln!("  ATRIUM_FOOTPRINT_TOLERANCE   Footprint match tolerance in meters (default: 0.05)");
    eprintln!("  ATRIUM_COORDINATES           right-handed-y-up | left-handed-y-up for output");
    eprintln!("  ATRIUM_INCLUDE_MESH          Keep global mesh anchors on export (default: false)");
}

fn print_outcome(outcome: &ReconcileOutcome) {
    for event in &outcome.events {
        println!("{event}");
    }
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }
    for failure in &outcome.failures {
        println!("failed: {failure}");
    }
}

async fn replay(ctx: &SceneContext, paths: &[PathBuf], verbose: bool) -> atrium_cli::Result<()> {
    for path in paths {
        if verbose {
            println!("# {}", path.display());
        }
        match ctx.load_from_source(&FileSource::new(path.clone())).await? {
            LoadOutcome::NoRoomsFound => {
                if verbose {
                    println!("no rooms found");
                }
            }
            LoadOutcome::Reconciled(outcome) => {
                if verbose {
                    print_outcome(&outcome);
                }
            }
        }
    }
    Ok(())
}

async fn run(command: &str, args: &[String], config: &CliConfig) -> atrium_cli::Result<()> {
    let ctx = SceneContext::new(config.reconcile_config());
    match command {
        "replay" => {
            let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
            replay(&ctx, &paths, true).await
        }
        "export" => {
            let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
            replay(&ctx, &paths, false).await?;
            let graph = ctx.read().await;
            let text = codec::serialize(graph.rooms(), config.coordinate_system, config.include_mesh)?;
            println!("{text}");
            Ok(())
        }
        "build" => {
            let (scene_path, rooms) = args.split_first().ok_or_else(|| {
                atrium_cli::Error::InvalidInput("build requires a scene file".to_string())
            })?;
            let text = tokio::fs::read_to_string(scene_path).await?;
            let scene = codec::deserialize_scene(&text)?;
            let names: Vec<&str> = rooms.iter().map(String::as_str).collect();
            let snapshot = authored_snapshot(&scene, &names, false)?;
            println!("{}", codec::write_snapshot(snapshot, config.coordinate_system)?);
            Ok(())
        }
        other => Err(atrium_cli::Error::InvalidInput(format!("unknown command: {other}"))),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ATRIUM_LOG")
                .unwrap_or_else(|_| "atrium=info,atrium_scene=info,atrium_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        if matches!(args.get(1).map(String::as_str), Some("-h" | "--help" | "help")) {
            print_usage();
            std::process::exit(0);
        }
        print_usage();
        std::process::exit(1);
    }

    let config = CliConfig::from_env();
    tracing::debug!(?config, "loaded configuration");

    if let Err(e) = run(&args[1], &args[2..], &config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
