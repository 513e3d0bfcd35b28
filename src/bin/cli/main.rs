use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use file_portal::{
    adapters::inbound::http::{dto::ErrorResponseDto, render::encode_path, UploadUrlResponseDto},
    domain::models::{ListingDocument, ListingEntry},
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "file-portal-cli")]
#[command(about = "CLI for browsing, uploading to and downloading from a file portal", long_about = None)]
struct Cli {
    /// Portal URL
    #[arg(short, long, env = "PORTAL_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Path prefix of the upload authorization endpoint
    #[arg(long, env = "UPLOAD_PREFIX", default_value = "/upload-url")]
    upload_prefix: String,

    /// Path prefix of the download endpoint
    #[arg(long, env = "DOWNLOAD_PREFIX", default_value = "/download")]
    download_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List a directory
    Ls {
        /// Directory to list, e.g. "docs/"
        #[arg(default_value = "")]
        path: String,
        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },

    /// Upload a file through a presigned URL
    Upload {
        /// File to upload
        file: PathBuf,
        /// Name to upload as; defaults to the file's name
        #[arg(short, long)]
        name: Option<String>,
        /// Content type sent with the upload
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },

    /// Download an object
    Download {
        /// Object key
        key: String,
        /// Output file path; defaults to the key's last segment
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct PortalClient {
    http: reqwest::Client,
    base: String,
    upload_prefix: String,
    download_prefix: String,
}

impl PortalClient {
    fn new(cli: &Cli) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: cli.url.trim_end_matches('/').to_string(),
            upload_prefix: cli.upload_prefix.clone(),
            download_prefix: cli.download_prefix.clone(),
        }
    }

    fn listing_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let dir = if path.is_empty() || path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };
        format!("{}/{}", self.base, encode_path(&dir))
    }

    fn download_url(&self, key: &str) -> String {
        format!("{}{}/{}", self.base, self.download_prefix, encode_path(key))
    }

    async fn list(&self, path: &str) -> Result<ListingDocument> {
        let response = self
            .http
            .get(self.listing_url(path))
            .query(&[("format", "json")])
            .send()
            .await
            .context("Failed to reach portal")?;
        let response = check(response).await?;
        response
            .json()
            .await
            .context("Portal returned an invalid listing")
    }

    async fn upload(&self, file: &Path, name: &str, content_type: &str) -> Result<UploadUrlResponseDto> {
        let data = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;

        let response = self
            .http
            .get(format!("{}{}", self.base, self.upload_prefix))
            .query(&[("filename", name)])
            .send()
            .await
            .context("Failed to reach portal")?;
        let authorization: UploadUrlResponseDto = check(response)
            .await?
            .json()
            .await
            .context("Portal returned an invalid upload authorization")?;

        let response = self
            .http
            .put(&authorization.url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .context("Failed to reach store")?;
        check(response).await?;

        Ok(authorization)
    }

    async fn download(&self, key: &str) -> Result<bytes::Bytes> {
        let response = self
            .http
            .get(self.download_url(key))
            .send()
            .await
            .context("Failed to reach portal")?;
        check(response)
            .await?
            .bytes()
            .await
            .context("Failed to read download body")
    }
}

/// Turn non-success responses into errors carrying the server's message
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponseDto>(&body) {
        Ok(error) => bail!("{} ({}): {}", status, error.error, error.message),
        Err(_) => bail!("{}: {}", status, body),
    }
}

fn print_listing(doc: &ListingDocument) {
    println!("/{}", doc.prefix);
    for entry in &doc.entries {
        match entry {
            ListingEntry::File {
                name,
                size,
                last_modified,
                ..
            } => println!(
                "{:>12}  {}  {}",
                size,
                last_modified.format("%Y-%m-%d %H:%M:%S"),
                name
            ),
            ListingEntry::Directory {
                name,
                object_count,
                last_modified,
                ..
            } => println!(
                "{:>12}  {}  {}/",
                format!("{} obj", object_count),
                last_modified.format("%Y-%m-%d %H:%M:%S"),
                name
            ),
        }
    }
}

fn default_output(key: &str) -> PathBuf {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() => PathBuf::from(name),
        _ => PathBuf::from("download"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = PortalClient::new(&cli);

    match &cli.command {
        Commands::Ls { path, json } => {
            let doc = client.list(path).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_listing(&doc);
            }
        }
        Commands::Upload {
            file,
            name,
            content_type,
        } => {
            let name = match name {
                Some(name) => name.clone(),
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .context("File has no usable name; pass --name")?,
            };
            let authorization = client.upload(file, &name, content_type).await?;
            println!("Uploaded {}", authorization.key);
        }
        Commands::Download { key, output } => {
            let data = client.download(key).await?;
            let output = output.clone().unwrap_or_else(|| default_output(key));
            tokio::fs::write(&output, &data)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {} ({} bytes)", output.display(), data.len());
        }
    }

    Ok(())
}
