use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use browser_artifacts::browsers::BrowserType;
use browser_artifacts::config::ExtractorConfig;
use browser_artifacts::error::ExtractionError;
use browser_artifacts::extract::Extractor;
use browser_artifacts::record::{
    ArtifactKind, ArtifactRequest, DataTypeFilter, ExtractionResult, DEFAULT_PAGE_SIZE,
};
use browser_artifacts::{export, progress};

#[derive(Parser)]
#[command(name = "browser-artifacts")]
#[command(about = "Read-only extraction of history, downloads, cookies, logins and autofill from Edge, Brave and Firefox", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Home directory to search instead of the current user's
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Chromium profile directory name
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Directory for temporary database snapshots
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of records
    Preview {
        /// edge, brave or firefox
        #[arg(short, long)]
        browser: String,

        /// all, history, downloads, cookies, logins or autofill
        #[arg(short = 't', long, default_value = "all")]
        data_type: String,

        /// Database bucket; defaults to the one the data type lives in
        #[arg(short, long)]
        artifact: Option<String>,

        /// Maximum records considered (1-1000)
        #[arg(short, long, default_value_t = 100)]
        limit: u32,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every record up to the limit as CSV
    Export {
        #[arg(short, long)]
        browser: String,

        #[arg(short = 't', long, default_value = "all")]
        data_type: String,

        #[arg(short, long)]
        artifact: Option<String>,

        #[arg(short, long, default_value_t = 100)]
        limit: u32,

        /// Output file (default: browser_data_<browser>_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract one data type from every browser concurrently
    Scan {
        #[arg(short = 't', long, default_value = "all")]
        data_type: String,

        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },

    /// Print the database path of every browser and bucket
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let extractor = Extractor::new(build_config(&cli)?);

    match cli.command {
        Commands::Preview {
            browser,
            data_type,
            artifact,
            limit,
            page,
            page_size,
            json,
        } => {
            let (browser, artifact, filter) = parse_target(&browser, &data_type, artifact.as_deref())?;
            let request = ArtifactRequest::new(browser, artifact, filter, limit, page, page_size)
                .or_else(exit_with)?;

            let result = extractor.extract(&request).or_else(exit_with)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_page(&result);
            }
        }

        Commands::Export {
            browser,
            data_type,
            artifact,
            limit,
            output,
        } => {
            let (browser, artifact, filter) = parse_target(&browser, &data_type, artifact.as_deref())?;
            info!("📤 Exporting {} {} records (limit {})", browser, filter, limit);

            let pb = progress::create_spinner(&format!("Reading {} {}", browser, filter));
            let result = match extractor.export_all(browser, artifact, filter, limit) {
                Ok(result) => result,
                Err(e) => {
                    progress::finish_with_error(&pb, e.kind().as_str());
                    return exit_with(e);
                }
            };
            progress::finish_with_success(&pb, &format!("{} records read", result.records.len()));

            let path = output.unwrap_or_else(|| {
                PathBuf::from(export::default_file_name(
                    browser,
                    chrono::Local::now().naive_local(),
                ))
            });
            export::export_to_file(&result.records, &path)?;
            println!("{}", path.display());
        }

        Commands::Scan { data_type, limit } => {
            let filter: DataTypeFilter = data_type.parse().or_else(exit_with)?;
            scan(&extractor, filter, limit).await?;
        }

        Commands::Paths => {
            for browser in BrowserType::all() {
                for artifact in ArtifactKind::all() {
                    match extractor.resolve(browser, artifact) {
                        Ok(path) => {
                            let marker = if path.exists() { "✅" } else { "  " };
                            println!("{} {:<8} {:<9} {}", marker, browser, artifact, path.display());
                        }
                        Err(e) => println!("❌ {:<8} {:<9} {}", browser, artifact, e),
                    }
                }
            }
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ExtractorConfig> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };
    if let Some(home) = &cli.home {
        config = config.with_home(home.clone());
    }
    if let Some(profile) = &cli.profile {
        config = config.with_profile(profile.clone());
    }
    if let Some(dir) = &cli.snapshot_dir {
        config = config.with_snapshot_dir(dir.clone());
    }
    Ok(config)
}

fn parse_target(
    browser: &str,
    data_type: &str,
    artifact: Option<&str>,
) -> Result<(BrowserType, ArtifactKind, DataTypeFilter)> {
    let browser: BrowserType = browser.parse().or_else(exit_with)?;
    let filter: DataTypeFilter = data_type.parse().or_else(exit_with)?;
    let artifact = match artifact {
        Some(name) => name.parse().or_else(exit_with)?,
        None => filter.bucket(),
    };
    Ok((browser, artifact, filter))
}

/// Print an extraction error with its stable kind and exit non-zero
fn exit_with<T>(e: ExtractionError) -> Result<T> {
    eprintln!("❌ [{}] {}", e.kind(), e);
    std::process::exit(1);
}

fn print_page(result: &ExtractionResult) {
    for record in &result.records {
        let visits = record
            .visit_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<9} {:<19} {:>6}  {}  {}",
            record.kind.label(),
            record.timestamp_display(),
            visits,
            record.url,
            record.title
        );
    }
    println!(
        "Page {}/{} ({} records, {} per page)",
        result.current_page, result.total_pages, result.total_records, result.page_size
    );
    for note in &result.notes {
        println!("⚠️  {}", note);
    }
}

async fn scan(extractor: &Extractor, filter: DataTypeFilter, limit: u32) -> Result<()> {
    let browsers = BrowserType::all();
    let pb = progress::create_scan_progress_bar(browsers.len() as u64, &format!("Scanning {}", filter));

    let tasks = browsers.iter().map(|&browser| {
        let extractor = extractor.clone();
        let pb = pb.clone();
        async move {
            let outcome = tokio::task::spawn_blocking(move || {
                let request = ArtifactRequest::export(browser, filter.bucket(), filter, limit)?;
                extractor.extract(&request)
            })
            .await
            .with_context(|| format!("{} scan task panicked", browser));
            pb.inc(1);
            (browser, outcome)
        }
    });
    let outcomes = futures::future::join_all(tasks).await;

    let mut found = 0u64;
    for (browser, outcome) in outcomes {
        match outcome? {
            Ok(result) => {
                found += result.total_records;
                println!("✅ {:<8} {} records", browser, result.total_records);
                for note in &result.notes {
                    warn!("{}: {}", browser, note);
                }
            }
            Err(e) => println!("❌ {:<8} [{}] {}", browser, e.kind(), e),
        }
    }

    progress::finish_with_success(&pb, &format!("{} records found", found));
    Ok(())
}
