//! Replay failed fetches from a failure log.
//!
//! Reads the log produced by a migration run, extracts the public URL from
//! each failure line, recomputes the destination path from the URL, and
//! re-fetches and re-uploads each image sequentially.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use fotomigra_cli::{init_tracing, print_banner};
use fotomigra_core::constants::{DEFAULT_N_TRIES, DEFAULT_TIMEOUT_SECS};
use fotomigra_core::naming::object_path_from_public_url;
use fotomigra_fetch::{default_placeholder, extract_failed_urls, FileFailureLog, Fetcher, ImageFetcher};
use fotomigra_migrate::Migrator;
use fotomigra_storage::{Bucket, GcsBucket};

#[derive(Parser)]
#[command(
    name = "retry-failed",
    about = "Re-fetch and re-upload the images recorded in a failure log"
)]
struct Cli {
    /// Failure log from a previous run
    #[arg(short = 'f', long)]
    log_file: PathBuf,

    /// Bucket the failed URLs point into
    #[arg(short = 'd', long)]
    download_bucket: String,

    /// Bucket where the images will be uploaded
    #[arg(short = 'u', long)]
    upload_bucket: String,

    /// Path to the service-account credentials file
    #[arg(short = 'k', long)]
    credentials: Option<PathBuf>,

    /// Broker name, used as the top-level destination folder
    #[arg(short = 'b', long)]
    broker: String,

    /// Public URL of the image used as a watermark
    #[arg(short = 'w', long)]
    watermark: Option<String>,

    /// Failure log for this replay run (defaults to retry.log)
    #[arg(long, default_value = "retry.log")]
    retry_log: PathBuf,

    /// Timeout in seconds for image and watermark-service requests
    #[arg(short = 'T', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Retry attempts after a failed watermark-service call
    #[arg(short = 'n', long, default_value_t = DEFAULT_N_TRIES)]
    n_tries: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.log_file)
        .with_context(|| format!("Failed to read failure log {}", cli.log_file.display()))?;
    let urls = extract_failed_urls(&content);
    if urls.is_empty() {
        println!("No failed image urls found in {}", cli.log_file.display());
        return Ok(());
    }

    let log = Arc::new(
        FileFailureLog::open(&cli.retry_log)
            .with_context(|| format!("Failed to open failure log {}", cli.retry_log.display()))?,
    );
    let fetcher = Arc::new(ImageFetcher::new(
        Duration::from_secs(cli.timeout),
        cli.n_tries,
        cli.watermark.clone(),
        default_placeholder()?,
        log,
    )?);
    let destination: Arc<dyn Bucket> = Arc::new(
        GcsBucket::new(cli.upload_bucket.clone(), cli.credentials.as_deref())
            .context("Failed to open upload bucket")?,
    );
    let migrator = Migrator::new(destination, fetcher.clone(), cli.broker.clone());

    print_banner();
    println!(
        "Replaying {} failed image(s) from {}",
        urls.len(),
        cli.log_file.display()
    );

    for url in &urls {
        let Some(object_path) = object_path_from_public_url(&cli.download_bucket, url) else {
            tracing::warn!(url = %url, "Logged url does not belong to the download bucket, skipping");
            continue;
        };
        let path = format!("{}/{}", cli.broker, object_path);

        let image = fetcher.fetch(url).await;
        let uploaded = migrator.upload_one(&path, image).await;
        if uploaded.is_empty() {
            println!("---- Failed to upload {}", path);
        } else {
            println!("---- Re-uploaded {}", path);
        }
    }

    print_banner();
    println!("Replay finished");

    Ok(())
}
