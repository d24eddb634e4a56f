//! API client for the Photos Library.
//!
//! - [`PhotosApi`]: single-page calls and collect-all helpers
//! - [`collect_pages`]: the pagination loop behind them

pub mod media;
pub mod pagination;

pub use media::PhotosApi;
pub use pagination::{collect_pages, Listing};
