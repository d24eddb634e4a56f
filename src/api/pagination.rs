//! Page-by-page collection of media items.

use std::future::Future;
use tracing::{info, warn};

use crate::error::{PhotosError, Result};
use crate::models::{MediaItem, MediaPage};

/// Everything gathered by a paginated query.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Items from every page that was read.
    pub items: Vec<MediaItem>,
    /// Number of pages requested.
    pub pages: usize,
    /// Why paging ended early, if it did.
    pub stopped: Option<String>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether every page up to the last token was read.
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

/// Follow `nextPageToken` until the last page.
///
/// `fetch` receives the token of the page to load (`None` for the first).
/// Paging stops, keeping what was collected, when a page has no
/// `mediaItems` or the API answers with a non-success status. Other errors
/// are returned.
pub async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Listing>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<MediaPage>>,
{
    let mut listing = Listing::default();
    let mut page_token: Option<String> = None;

    loop {
        listing.pages += 1;
        info!("Fetching page {}...", listing.pages);

        let page = match fetch(page_token.take()).await {
            Ok(page) => page,
            Err(PhotosError::HttpStatus(status, body)) => {
                warn!("Page {} failed with status {}: {}", listing.pages, status, body);
                listing.stopped = Some(format!("HTTP {}: {}", status, body));
                break;
            }
            Err(e) => return Err(e),
        };

        let next = page.next_token().map(str::to_string);

        match page.media_items {
            Some(items) => listing.items.extend(items),
            None => {
                warn!("No media items found or error in response on page {}", listing.pages);
                listing.stopped = Some("No media items found or error in response".to_string());
                break;
            }
        }

        match next {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(
        "Collected {} media items from {} page(s)",
        listing.items.len(),
        listing.pages
    );

    Ok(listing)
}
