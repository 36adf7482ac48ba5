//! subwatch main entry point
//!
//! This is the command-line interface for the subwatch subdomain monitor.

use clap::Parser;
use std::path::{Path, PathBuf};
use subwatch::config::{load_config_with_hash, Config};
use subwatch::scanner::build_scan_loop;
use tracing_subscriber::EnvFilter;

/// subwatch: a tracked-domain subdomain monitor
///
/// subwatch periodically enumerates subdomains of the domains declared in
/// its configuration, stores every hostname it finds, and checks new ones
/// over DNS and HTTP.
#[derive(Parser, Debug)]
#[command(name = "subwatch")]
#[command(version)]
#[command(about = "A tracked-domain subdomain monitor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be tracked without scanning
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "once"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "once"])]
    stats: bool,

    /// Write a markdown inventory report to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats", "once"])]
    export_summary: Option<PathBuf>,

    /// Mark every subdomain in the exported report as seen
    #[arg(long, requires = "export_summary")]
    acknowledge: bool,

    /// Run a single scan cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_summary {
        handle_export_summary(&config, path, cli.acknowledge)?;
    } else {
        handle_scan(&config, cli.once).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("subwatch=info,warn"),
            1 => EnvFilter::new("subwatch=debug,info"),
            2 => EnvFilter::new("subwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be tracked
fn handle_dry_run(config: &Config) {
    println!("=== subwatch Dry Run ===\n");

    println!("Storage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nScheduler:");
    println!("  Poll interval: {}s", config.scheduler.poll_interval);

    println!("\nCollaborators:");
    println!("  HTTP timeout: {}s", config.http.timeout);
    println!("  User agent: {}", config.http.user_agent);
    println!("  DNS timeout: {}s", config.dns.timeout);
    println!("  crt.sh: {}", config.sources.crtsh_url);
    println!("  Wayback Machine: {}", config.sources.webarchive_url);

    println!("\nDeclared Domains ({}):", config.domains.len());
    for entry in &config.domains {
        println!(
            "  - {} every {}s via [{}] (DNS {}, HTTP {})",
            entry.name,
            entry.scan_interval,
            entry.scanners.join(", "),
            if entry.dns_check { "on" } else { "off" },
            if entry.http_check { "on" } else { "off" },
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use subwatch::output::{load_statistics, print_statistics};
    use subwatch::storage::open_storage;

    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown report
fn handle_export_summary(
    config: &Config,
    output_path: &Path,
    acknowledge: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use subwatch::output::{acknowledge_new, generate_markdown_summary, generate_summary};
    use subwatch::storage::open_storage;

    println!("=== Exporting Inventory ===\n");
    println!("Database: {}", config.storage.database_path);
    println!("Output: {}", output_path.display());
    println!();

    let mut storage = open_storage(Path::new(&config.storage.database_path))?;

    tracing::info!("Loading inventory from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, output_path)?;
    println!("✓ Summary exported to: {}", output_path.display());

    if acknowledge {
        let count = acknowledge_new(&mut storage, &summary)?;
        println!("✓ Acknowledged {} new subdomain(s)", count);
    }

    Ok(())
}

/// Handles the main scan operation
async fn handle_scan(config: &Config, once: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut scan_loop = match build_scan_loop(config) {
        Ok(scan_loop) => scan_loop,
        Err(e) => {
            tracing::error!("Failed to start scanner: {}", e);
            return Err(e.into());
        }
    };

    if once {
        let report = scan_loop.run_cycle().await?;
        tracing::info!(
            "Single cycle complete: {} scanned, {} skipped, {} failed, {} new subdomains",
            report.scanned,
            report.skipped,
            report.failed,
            report.new_subdomains
        );
        return Ok(());
    }

    let token = scan_loop.cancellation_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        tracing::info!("Interrupt received, stopping scan loop");
        token.cancel();

        // A second interrupt exits even if shutdown is stuck
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Second interrupt received, exiting");
            std::process::exit(130);
        }
    });

    scan_loop.run().await;
    Ok(())
}
