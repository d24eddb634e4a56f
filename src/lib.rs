//! # Photoscoop
//!
//! A Rust library for summarizing and downloading a Google Photos library.
//!
//! ## Quick Start
//!
//! The easiest way to use this library is through the [`Photoscoop`] struct:
//!
//! ```rust,no_run
//! use photoscoop::{Date, DateRange, Photoscoop, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reuses token.json, refreshes it, or asks for consent
//!     let scoop = Photoscoop::connect(Settings::default()).await?;
//!
//!     // Metadata table of a date range
//!     let range = DateRange::new(Date::new(2023, 1, 1), Date::new(2023, 1, 26))?;
//!     let listing = scoop.search_by_date(range, None).await?;
//!     println!("{}", Photoscoop::summarize(&listing.items).head(5));
//!
//!     // Download the whole library
//!     let library = scoop.list_library().await?;
//!     let result = scoop.download(&library.items).await?;
//!     println!("Downloaded {} files", result.successful.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Low-Level APIs
//!
//! - [`PhotosApi`] - Library API calls, one page or all pages
//! - [`Authenticator`] - token file handling and the OAuth consent flow
//! - [`MediaDownloader`] - paced, skip-if-exists downloads
//! - [`MediaFrame`] - flattened metadata tables

pub mod api;
pub mod auth;
pub mod config;
pub mod download;
pub mod error;
pub mod frame;
pub mod models;
mod photoscoop;

// Main interface (recommended)
pub use photoscoop::Photoscoop;

// Low-level APIs
pub use api::{Listing, PhotosApi};
pub use auth::{Authenticator, ConsentPrompt, StoredToken};
pub use config::Settings;
pub use download::{BatchDownloadResult, DownloadResult, MediaDownloader};
pub use error::PhotosError;
pub use frame::{MediaFrame, MediaRow};
pub use models::{Date, DateRange, Filters, MediaItem, MediaType};
