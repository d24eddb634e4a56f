//! Unified Photoscoop interface.
//!
//! This module ties authentication, the API client, tabulation and
//! downloads together behind one struct.

use reqwest::Client;

use crate::api::{Listing, PhotosApi};
use crate::auth::{Authenticator, ConsentPrompt, StoredToken};
use crate::config::Settings;
use crate::download::{BatchDownloadResult, MediaDownloader};
use crate::error::{PhotosError, Result};
use crate::frame::MediaFrame;
use crate::models::{DateRange, Filters, MediaItem, MediaType};

/// Main Photoscoop interface.
///
/// # Example
///
/// ```rust,no_run
/// use photoscoop::{Date, DateRange, Photoscoop, Settings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scoop = Photoscoop::connect(Settings::default()).await?;
///
///     let range = DateRange::new(Date::new(2023, 1, 1), Date::new(2023, 1, 26))?;
///     let listing = scoop.search_by_date(range, None).await?;
///     println!("{}", Photoscoop::summarize(&listing.items).head(5));
///
///     let library = scoop.list_library().await?;
///     let result = scoop.download(&library.items).await?;
///     println!("Downloaded {} files", result.successful.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Photoscoop {
    api: PhotosApi,
    downloader: MediaDownloader,
    settings: Settings,
}

impl Photoscoop {
    /// Authenticate (loading, refreshing or obtaining a token) and build
    /// the clients.
    pub async fn connect(settings: Settings) -> Result<Self> {
        let client = http_client()?;
        let token = Authenticator::new(client.clone(), &settings)
            .credentials()
            .await?;
        Self::from_token(client, &token, settings)
    }

    /// Like [`connect`](Self::connect), with a custom consent prompt.
    pub async fn connect_with_prompt<P: ConsentPrompt + 'static>(
        settings: Settings,
        prompt: P,
    ) -> Result<Self> {
        let client = http_client()?;
        let token = Authenticator::new(client.clone(), &settings)
            .with_prompt(prompt)
            .credentials()
            .await?;
        Self::from_token(client, &token, settings)
    }

    fn from_token(client: Client, token: &StoredToken, settings: Settings) -> Result<Self> {
        let api = PhotosApi::new(client.clone(), token.access_token()?);
        Ok(Self::with_api(client, api, settings))
    }

    /// Build from an existing API client.
    pub fn with_api(client: Client, api: PhotosApi, settings: Settings) -> Self {
        let downloader = MediaDownloader::new(client, &settings);
        Self {
            api,
            downloader,
            settings,
        }
    }

    pub fn api(&self) -> &PhotosApi {
        &self.api
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ==================
    // QUERIES
    // ==================

    /// All items taken within `range`, optionally of one media type.
    pub async fn search_by_date(
        &self,
        range: DateRange,
        media_type: Option<MediaType>,
    ) -> Result<Listing> {
        let mut filters = Filters::date_range(range);
        if let Some(media_type) = media_type {
            filters = filters.with_media_type(media_type);
        }
        self.api.search_all(filters, self.settings.page_size).await
    }

    /// Every item in the library.
    pub async fn list_library(&self) -> Result<Listing> {
        self.api.list_all(self.settings.page_size).await
    }

    /// Fetch one item, e.g. to get a fresh `baseUrl`.
    pub async fn get_media_item(&self, media_item_id: &str) -> Result<MediaItem> {
        if media_item_id.is_empty() {
            return Err(PhotosError::ApiError("empty media item id".to_string()));
        }
        self.api.get_media_item(media_item_id).await
    }

    // ==================
    // CONSUMERS
    // ==================

    /// Build the metadata table for a set of items.
    pub fn summarize(items: &[MediaItem]) -> MediaFrame {
        MediaFrame::from_items(items)
    }

    /// Download items into the configured output directory.
    pub async fn download(&self, items: &[MediaItem]) -> Result<BatchDownloadResult> {
        self.downloader.download_all(items).await
    }
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("photoscoop/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PhotosError::ApiError(format!("Failed to create client: {}", e)))
}
