use anyhow::{Context, Result};
use clap::Parser;
use file_portal::{
    adapters::{
        inbound::http::router::{create_router, create_store_router},
        outbound::storage::S3Config,
    },
    app::{AppBuilder, AppConfig, StorageBackend},
    services::{CachePolicy, DownloadSettings, ListingSettings, RoutePatterns, UploadSettings},
};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "file-portal-server")]
#[command(about = "File portal: presigned uploads, virtual directory listings and forced downloads", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Storage backend type (memory or s3)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// S3 endpoint URL for S3-compatible services
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Allow plain HTTP to the S3 endpoint
    #[arg(long, env = "S3_ALLOW_HTTP", default_value = "false")]
    s3_allow_http: bool,

    /// Port of the development store (memory backend only)
    #[arg(long, env = "DEV_STORE_PORT", default_value = "8081")]
    store_port: u16,

    /// Secret for signing development store upload URLs; random when unset
    #[arg(long, env = "DEV_STORE_SECRET")]
    dev_store_secret: Option<String>,

    /// Base URL clients use to reach the development store
    #[arg(long, env = "DEV_STORE_PUBLIC_URL")]
    dev_store_public_url: Option<String>,

    /// Directory every upload key is placed under, e.g. "uploads/"
    #[arg(long, env = "UPLOAD_ROOT", default_value = "")]
    upload_root: String,

    /// Upload URL lifetime in seconds
    #[arg(long, env = "UPLOAD_URL_TTL_SECS", default_value = "300")]
    upload_url_ttl_secs: u64,

    /// Path prefix of the upload authorization endpoint
    #[arg(long, env = "UPLOAD_PREFIX", default_value = "/upload-url")]
    upload_prefix: String,

    /// Path prefix of the download endpoint
    #[arg(long, env = "DOWNLOAD_PREFIX", default_value = "/download")]
    download_prefix: String,

    /// Keys requested per store listing page
    #[arg(long, env = "LISTING_PAGE_SIZE", default_value = "1000")]
    listing_page_size: usize,

    /// Cache lifetime for listings
    #[arg(long, env = "LISTING_MAX_AGE_SECS", default_value = "60")]
    listing_max_age_secs: u64,

    /// Cache lifetime for downloads
    #[arg(long, env = "DOWNLOAD_MAX_AGE_SECS", default_value = "86400")]
    download_max_age_secs: u64,

    /// Download filename for keys without a final segment
    #[arg(long, env = "FALLBACK_FILENAME", default_value = "download")]
    fallback_filename: String,

    /// Timeout for store calls and whole listings
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value = "10")]
    store_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => {
                let public_endpoint = self
                    .dev_store_public_url
                    .clone()
                    .unwrap_or_else(|| format!("http://127.0.0.1:{}", self.store_port));
                match &self.dev_store_secret {
                    Some(secret) => StorageBackend::InMemory {
                        signing_secret: secret.clone(),
                        public_endpoint,
                    },
                    None => StorageBackend::in_memory_at(public_endpoint),
                }
            }
            "s3" => {
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?;

                StorageBackend::S3(S3Config {
                    bucket,
                    region: self.s3_region.clone(),
                    access_key: self.s3_access_key.clone(),
                    secret_key: self.s3_secret_key.clone(),
                    endpoint: self.s3_endpoint.clone(),
                    allow_http: self.s3_allow_http,
                })
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        let store_timeout = Duration::from_secs(self.store_timeout_secs);

        Ok(AppConfig {
            storage_backend,
            routes: RoutePatterns {
                upload_prefix: self.upload_prefix.clone(),
                download_prefix: self.download_prefix.clone(),
            },
            cache: CachePolicy {
                listing_max_age_secs: self.listing_max_age_secs,
                download_max_age_secs: self.download_max_age_secs,
            },
            upload: UploadSettings {
                root: self.upload_root.clone(),
                ttl: Duration::from_secs(self.upload_url_ttl_secs),
            },
            listing: ListingSettings {
                page_size: self.listing_page_size,
                timeout: store_timeout,
            },
            download: DownloadSettings {
                fallback_filename: self.fallback_filename.clone(),
            },
            store_timeout,
        })
    }

    fn init_logging(&self) -> Result<()> {
        // RUST_LOG wins over --log-level when set
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.log_level.to_lowercase()))
            .context("Invalid log level")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting File Portal");
    info!("Storage backend: {}", cli.storage_backend);

    let config = cli.to_app_config()?;
    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .context("Failed to build application")?;

    let router = create_router(app.state());
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Portal listening on http://{}", addr);

    let store_server = match app.store_state() {
        Some(store_state) => {
            let store_addr: SocketAddr = format!("{}:{}", cli.host, cli.store_port).parse()?;
            let store_listener = TcpListener::bind(store_addr).await?;
            info!("Development store listening on http://{}", store_addr);
            Some(tokio::spawn(async move {
                axum::serve(store_listener, create_store_router(store_state))
                    .with_graceful_shutdown(shutdown_signal())
                    .await
            }))
        }
        None => None,
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to start server")?;

    if let Some(handle) = store_server {
        handle
            .await
            .context("Development store task panicked")?
            .context("Development store failed")?;
    }

    Ok(())
}
