//! Sequential media downloads.

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{PhotosError, Result};
use crate::models::MediaItem;

/// Result of a single download.
#[derive(Debug)]
pub struct DownloadResult {
    /// Path of the written file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Media item ID.
    pub id: String,
}

/// Result of downloading a list of items.
#[derive(Debug)]
pub struct BatchDownloadResult {
    /// Output directory.
    pub directory: PathBuf,
    /// Downloaded files.
    pub successful: Vec<DownloadResult>,
    /// Files that already existed.
    pub skipped: Vec<PathBuf>,
    /// Failed items (filename, error message).
    pub failed: Vec<(String, String)>,
}

impl BatchDownloadResult {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            successful: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Total number of items handled.
    pub fn total(&self) -> usize {
        self.successful.len() + self.skipped.len() + self.failed.len()
    }

    pub fn all_successful(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes media items into a directory, one at a time.
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    client: Client,
    output_dir: PathBuf,
    batch_size: usize,
    batch_pause: Duration,
    overwrite: bool,
}

impl MediaDownloader {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            output_dir: settings.output_dir.clone(),
            batch_size: settings.batch_size,
            batch_pause: settings.batch_pause,
            overwrite: settings.overwrite,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where an item would be written.
    pub fn target_path(&self, item: &MediaItem) -> PathBuf {
        self.output_dir.join(file_name_for(item))
    }

    /// Download every item that is not on disk yet.
    ///
    /// Failures are recorded and do not stop the loop. After every
    /// `batch_size` requests the loop sleeps for `batch_pause`.
    pub async fn download_all(&self, items: &[MediaItem]) -> Result<BatchDownloadResult> {
        fs::create_dir_all(&self.output_dir).await?;

        let mut result = BatchDownloadResult::new(self.output_dir.clone());
        let mut attempted = 0usize;

        for (idx, item) in items.iter().enumerate() {
            let path = self.target_path(item);

            if !self.overwrite {
                match fs::try_exists(&path).await {
                    Ok(true) => {
                        debug!("Skipping {}, already downloaded", path.display());
                        result.skipped.push(path);
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Cannot check {}: {}", path.display(), e);
                        result.failed.push((item.filename.clone(), e.to_string()));
                        continue;
                    }
                }
            }

            if should_pause(attempted, self.batch_size) {
                debug!("Pausing {:?} after {} downloads", self.batch_pause, attempted);
                tokio::time::sleep(self.batch_pause).await;
            }
            attempted += 1;

            info!("Downloading {}/{}: {}", idx + 1, items.len(), item.filename);

            match self.download_item(item, &path).await {
                Ok(download) => result.successful.push(download),
                Err(e) => {
                    warn!("Failed to download {}: {}", item.filename, e);
                    result.failed.push((item.filename.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Downloaded {}, skipped {}, failed {}",
            result.successful.len(),
            result.skipped.len(),
            result.failed.len()
        );

        Ok(result)
    }

    /// Download one item to `path`, going through a `.part` file.
    pub async fn download_item(&self, item: &MediaItem, path: &Path) -> Result<DownloadResult> {
        if item.base_url.is_empty() {
            return Err(PhotosError::NoDataApi(format!("no baseUrl for {}", item.id)));
        }

        let response = self.client.get(item.download_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PhotosError::HttpStatus(status.as_u16(), body));
        }

        let part = part_path(path);
        let written = match write_body(response, &part).await {
            Ok(size) => fs::rename(&part, path)
                .await
                .map(|()| size)
                .map_err(PhotosError::from),
            Err(e) => Err(e),
        };
        let size = match written {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                return Err(e);
            }
        };

        Ok(DownloadResult {
            path: path.to_path_buf(),
            size,
            id: item.id.clone(),
        })
    }
}

/// Stream a response body into a new file.
async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut size = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(size)
}

/// Whether to sleep before the next request.
fn should_pause(attempted: usize, batch_size: usize) -> bool {
    batch_size > 0 && attempted > 0 && attempted % batch_size == 0
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Local file name for an item, falling back to its ID.
fn file_name_for(item: &MediaItem) -> String {
    let name = sanitize_filename(&item.filename);
    if name.is_empty() || name == "." || name == ".." {
        sanitize_filename(&item.id)
    } else {
        name
    }
}

/// Sanitize a string for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
        .trim()
        .to_string()
}
