//! Fotomigra — migrate broker listing photos between storage buckets,
//! optionally watermarking them, into a broker-named folder hierarchy.
//!
//! Failures degrade to the placeholder image or a skipped upload and are
//! recorded in the failure log for `retry-failed`; only configuration
//! errors exit nonzero.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use clap::Parser;

use fotomigra_cli::{init_tracing, print_banner};
use fotomigra_core::constants::{DEFAULT_N_TRIES, DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS};
use fotomigra_core::naming::format_name;
use fotomigra_core::MigrationConfig;
use fotomigra_fetch::{default_placeholder, FileFailureLog, ImageFetcher};
use fotomigra_migrate::{blueprint_groups, photo_groups, Migrator};
use fotomigra_storage::{Bucket, GcsBucket};

#[derive(Parser)]
#[command(
    name = "fotomigra",
    about = "Migrate broker listing photos between storage buckets, applying a watermark"
)]
struct Cli {
    /// Bucket holding the images to download
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

    /// Failure log file (defaults to logs.log)
    #[arg(short = 'f', long)]
    log_file: Option<PathBuf>,

    /// Worker pool size for the photo migration phase
    #[arg(short = 't', long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Timeout in seconds for image and watermark-service requests
    #[arg(short = 'T', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Retry attempts after a failed watermark-service call
    #[arg(short = 'n', long, default_value_t = DEFAULT_N_TRIES)]
    n_tries: u32,

    /// Replacement placeholder image substituted for failed fetches
    #[arg(long)]
    placeholder: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> (MigrationConfig, Option<PathBuf>) {
        let placeholder = self.placeholder;
        let config = MigrationConfig {
            download_bucket: self.download_bucket,
            upload_bucket: self.upload_bucket,
            credentials_path: self.credentials,
            broker_name: self.broker,
            watermark_url: self.watermark,
            log_file: self.log_file,
            threads: self.threads,
            timeout: Duration::from_secs(self.timeout),
            n_tries: self.n_tries,
        };
        (config, placeholder)
    }
}

fn load_placeholder(path: Option<&PathBuf>) -> anyhow::Result<Bytes> {
    match path {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read placeholder image {}", path.display()))?;
            Ok(Bytes::from(data))
        }
        None => default_placeholder(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let (config, placeholder_path) = Cli::parse().into_config();

    let folded = format_name(&config.broker_name);
    if config.broker_name != folded {
        tracing::warn!(
            broker = %config.broker_name,
            suggested = %folded,
            "Broker name contains uppercase or accented characters; destination folders use it verbatim"
        );
    }

    // Configuration problems are fatal here, before any pool work begins.
    let placeholder = load_placeholder(placeholder_path.as_ref())?;
    let log_path = config.log_file_or_default();
    let log = Arc::new(
        FileFailureLog::open(&log_path)
            .with_context(|| format!("Failed to open failure log {}", log_path.display()))?,
    );
    let fetcher = Arc::new(ImageFetcher::new(
        config.timeout,
        config.n_tries,
        config.watermark_url.clone(),
        placeholder,
        log,
    )?);
    let credentials = config.credentials_path.as_deref();
    let source: Arc<dyn Bucket> = Arc::new(
        GcsBucket::new(config.download_bucket.clone(), credentials)
            .context("Failed to open download bucket")?,
    );
    let destination: Arc<dyn Bucket> = Arc::new(
        GcsBucket::new(config.upload_bucket.clone(), credentials)
            .context("Failed to open upload bucket")?,
    );

    print_banner();
    println!(
        "Getting all images public urls from bucket: {}",
        config.download_bucket
    );
    let photos = photo_groups(source.as_ref())
        .await
        .context("Failed to list photo groups from the download bucket")?;

    println!(
        "Getting all blueprint images from bucket: {}",
        config.download_bucket
    );
    let blueprints = blueprint_groups(source.as_ref())
        .await
        .context("Failed to list blueprint groups from the download bucket")?;

    let photo_count: usize = photos.values().map(Vec::len).sum();
    print_banner();
    println!(
        "Downloading images from public urls obtained and uploading them to the new bucket: {} \
         ({} approximated images and {} blueprint approximated images)\n",
        config.upload_bucket,
        photo_count,
        blueprints.len() * 2
    );

    let migrator = Migrator::new(destination, fetcher, config.broker_name.clone());

    migrator.migrate_photos(&photos, config.threads).await;
    print_banner();
    println!("All images uploaded successfully!");

    let results = migrator.migrate_blueprints(&blueprints).await;
    let skipped = results.iter().filter(|r| r.is_err()).count();
    print_banner();
    println!("All blueprint images uploaded successfully!");
    if skipped > 0 {
        println!("({} incomplete blueprint set(s) skipped, see log)", skipped);
    }

    Ok(())
}
