//! Barvault CLI: build, watch, and inspect commands.
//!
//! Commands:
//! - `build`: archive every configured source once and write a manifest
//! - `watch`: stay resident and run `build` once a day after the build time
//! - `inspect`: list the entries of a produced archive

use anyhow::{bail, Context, Result};
use barvault_core::ArtifactManifestEntry;
use barvault_runner::{
    build_selected, write_manifest, BuildReport, BuildSchedule, ManifestFormat, ResourceKey,
    RunConfig,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "barvault",
    about = "Barvault CLI: date-bucketed market data archives"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive the configured sources once.
    Build {
        /// Path to the TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Only build these resources (e.g. sse.m5). Defaults to all.
        #[arg(long = "resource")]
        resources: Vec<String>,

        /// Write the manifest here.
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Manifest format: json or csv. Inferred from the extension by default.
        #[arg(long)]
        format: Option<String>,

        /// Treat this date (YYYY-MM-DD) as today. Defaults to the local date.
        #[arg(long)]
        today: Option<String>,
    },
    /// Rebuild once a day after the configured build time.
    Watch {
        /// Path to the TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Seconds between schedule checks.
        #[arg(long, default_value_t = 60)]
        poll_secs: u64,

        /// Directory for daily manifests (manifest_YYYYMMDD.json).
        #[arg(long)]
        manifest_dir: Option<PathBuf>,
    },
    /// List the entries of an archive.
    Inspect {
        /// Archive file to read.
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            config,
            resources,
            manifest,
            format,
            today,
        } => run_build(&config, &resources, manifest, format, today),
        Commands::Watch {
            config,
            poll_secs,
            manifest_dir,
        } => run_watch(&config, poll_secs, manifest_dir),
        Commands::Inspect { archive } => run_inspect(&archive),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run_build(
    config_path: &Path,
    resources: &[String],
    manifest: Option<PathBuf>,
    format: Option<String>,
    today: Option<String>,
) -> Result<()> {
    let config = RunConfig::from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let only = resources
        .iter()
        .map(|r| r.parse::<ResourceKey>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;
    let today = today
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let reports = build_selected(&config, today, &only)?;
    if reports.is_empty() {
        bail!("no configured source matches {resources:?}");
    }
    print_reports(&reports);

    if let Some(path) = manifest {
        let format = match format {
            Some(f) => f.parse()?,
            None => ManifestFormat::from_path(&path),
        };
        write_manifest(&path, &collect_entries(&reports), format)?;
        println!("Manifest written to: {}", path.display());
    }

    if reports.iter().any(|r| !r.is_ok()) {
        std::process::exit(1);
    }
    Ok(())
}

fn run_watch(config_path: &Path, poll_secs: u64, manifest_dir: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let schedule = BuildSchedule::new(config.build_time);
    info!(build_time = %config.build_time, sources = config.sources.len(), "watching");

    let mut last_build = None;
    loop {
        let now = chrono::Local::now().naive_local();
        if schedule.is_due(last_build, now) {
            let reports = build_selected(&config, now.date(), &[])?;
            let failed = reports.iter().filter(|r| !r.is_ok()).count();
            info!(resources = reports.len(), failed, "daily build finished");

            if let Some(dir) = &manifest_dir {
                let path = dir.join(format!("manifest_{}.json", now.format("%Y%m%d")));
                if let Err(err) = write_manifest(&path, &collect_entries(&reports), ManifestFormat::Json) {
                    error!(error = %err, "failed to write manifest");
                }
            }
            last_build = Some(now);
        }
        std::thread::sleep(Duration::from_secs(poll_secs.max(1)));
    }
}

fn run_inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    println!("Archive: {}", path.display());
    println!("{:<48} {:>10} {:>12}", "Entry", "Size", "Mtime");
    println!("{}", "-".repeat(72));

    let mut count = 0usize;
    let mut total: u64 = 0;
    for entry in archive.entries().context("failed to read archive")? {
        let entry = entry.context("corrupt archive entry")?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let size = entry.header().size()?;
        let mtime = entry.header().mtime()?;
        println!("{:<48} {:>10} {:>12}", name, format_size(size), mtime);
        count += 1;
        total += size;
    }
    println!();
    println!("{count} entries, {}", format_size(total));
    Ok(())
}

fn collect_entries(reports: &[BuildReport]) -> Vec<ArtifactManifestEntry> {
    reports.iter().flat_map(|r| r.entries.iter().cloned()).collect()
}

fn print_reports(reports: &[BuildReport]) {
    println!();
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>10}  Status",
        "Resource", "Files", "Skipped", "Chunks", "Written"
    );
    println!("{}", "-".repeat(60));
    for r in reports {
        let status = match &r.error {
            Some(err) => format!("FAILED: {err}"),
            None => format!("ok ({} archives)", r.entries.len()),
        };
        println!(
            "{:<10} {:>8} {:>8} {:>8} {:>10}  {}",
            r.key.to_string(),
            r.stats.files_archived,
            r.stats.files_skipped,
            r.stats.chunks_written,
            format_size(r.stats.bytes_written),
            status
        );
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
