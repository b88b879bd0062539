use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::IndexConfig;
use crate::indexer::IndexManager;
use crate::models::RebuildReport;
use crate::utils::{format_path_with_tilde, get_project_root, normalize_asset_arg};

#[derive(Parser)]
#[command(name = "prefab-index")]
#[command(version = "0.1.0")]
#[command(about = "Query which prefabs reference which GUIDs", long_about = None)]
pub struct Cli {
    /// Project root (defaults to $PREFAB_INDEX_ROOT, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Save the index after every update instead of once at exit
    #[arg(long, global = true)]
    pub save_on_change: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rescan every prefab and rewrite the cache (exits non-zero if any prefab was skipped)
    Rebuild {
        /// Delete the existing cache first (recovers from a corrupt cache)
        #[arg(long)]
        discard: bool,
    },
    /// List the GUIDs a prefab references
    Refs {
        /// Prefab path relative to the project root
        asset: String,
    },
    /// List the prefabs referencing a GUID
    Users {
        /// GUID to look up
        guid: String,
    },
    /// Rescan the given prefabs after they changed on disk
    Update {
        #[arg(required = true)]
        assets: Vec<String>,
    },
    /// Drop deleted prefabs from the index
    Remove {
        #[arg(required = true)]
        assets: Vec<String>,
    },
    /// Show index statistics
    Stats,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => get_project_root()?,
    };
    let mut config = IndexConfig::from_env(&root);
    if cli.save_on_change {
        config = config.with_persist_on_every_change(true);
    }

    match command {
        Commands::Rebuild { discard } => rebuild(config, *discard, cli.json),
        Commands::Refs { asset } => {
            let key = normalize_asset_arg(&root, asset)?;
            let manager = open_ready(config)?;
            print_set(&manager.identifiers_of(&key)?, cli.json)
        }
        Commands::Users { guid } => {
            let manager = open_ready(config)?;
            print_set(&manager.assets_referencing(guid.trim())?, cli.json)
        }
        Commands::Update { assets } => {
            let mut manager = open_ready(config)?;
            let result = update_assets(&mut manager, &root, assets);
            // Flush whatever was applied even if a later asset failed
            manager.on_shutdown_or_rebuild_trigger().context("Failed to save index")?;
            result
        }
        Commands::Remove { assets } => {
            let mut manager = open_ready(config)?;
            let result = remove_assets(&mut manager, &root, assets);
            manager.on_shutdown_or_rebuild_trigger().context("Failed to save index")?;
            result
        }
        Commands::Stats => show_stats(config, cli.json),
    }
}

/// Install env_logger; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // A logger may already be installed by an embedding binary
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn open_ready(config: IndexConfig) -> Result<IndexManager> {
    let mut manager = IndexManager::open(config);
    manager.initialize().context(
        "Failed to initialize index (run `prefab-index rebuild --discard` to reset a corrupt cache)",
    )?;
    Ok(manager)
}

fn update_assets(manager: &mut IndexManager, root: &Path, assets: &[String]) -> Result<()> {
    for asset in assets {
        let key = normalize_asset_arg(root, asset)?;
        manager.on_asset_changed(&key).with_context(|| format!("Failed to update {}", key))?;
        println!("Updated {}", key);
    }
    Ok(())
}

fn remove_assets(manager: &mut IndexManager, root: &Path, assets: &[String]) -> Result<()> {
    for asset in assets {
        let key = normalize_asset_arg(root, asset)?;
        if manager.on_asset_removed(&key)? {
            println!("Removed {}", key);
        } else {
            println!("Not indexed: {}", key);
        }
    }
    Ok(())
}

fn rebuild(config: IndexConfig, discard: bool, json: bool) -> Result<()> {
    let mut manager = IndexManager::open(config);
    if discard {
        manager.store().clear().context("Failed to discard index cache")?;
    }

    let report = manager.force_full_rebuild().context("Full rebuild failed")?;
    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    // The index is saved either way; the exit status tells scripts it is incomplete
    if report.has_failures() {
        bail!("{} of {} prefabs could not be read", report.skipped.len(), report.total());
    }
    Ok(())
}

fn print_report(report: &RebuildReport) {
    println!("Rebuilt index: {} prefabs scanned, {} skipped", report.scanned, report.skipped.len());
    for skipped in &report.skipped {
        eprintln!("  skipped {}: {}", skipped.path, skipped.reason);
    }
}

fn print_set(values: &BTreeSet<String>, json: bool) -> Result<()> {
    if json {
        return print_json(values);
    }
    for value in values {
        println!("{}", value);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

fn show_stats(config: IndexConfig, json: bool) -> Result<()> {
    let manager = open_ready(config)?;
    let stats = manager.stats()?;

    if json {
        return print_json(&stats);
    }

    println!("Prefab Index Statistics");
    println!("=======================");
    println!("Prefabs indexed: {}", stats.assets);
    println!("GUIDs referenced: {}", stats.guids);
    println!("References: {}", stats.links);
    println!();
    println!("Project root: {}", format_path_with_tilde(manager.config().project_root()));
    println!("Cache directory: {}", format_path_with_tilde(manager.store().cache_dir()));

    if let Some(report) = manager.last_rebuild() {
        println!("Rebuilt this run: {} scanned, {} skipped", report.scanned, report.skipped.len());
    }

    Ok(())
}
