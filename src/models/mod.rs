//! Data models for Photos Library API requests and responses.

pub mod filter;
pub mod media_item;
pub mod page;

// Re-exports for convenience
pub use filter::{Date, DateFilter, DateRange, Filters, MediaType, SearchRequest};
pub use media_item::{ContributorInfo, MediaItem, MediaMetadata, PhotoMetadata, VideoMetadata};
pub use page::MediaPage;
