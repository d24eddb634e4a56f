//! One page of a list or search response.

use serde::{Deserialize, Serialize};

use super::media_item::MediaItem;

/// A page of media items.
///
/// `media_items` is `None` when the field is missing from the response,
/// which is how the API reports an empty search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_items: Option<Vec<MediaItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl MediaPage {
    /// The token of the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response() {
        let page: MediaPage = serde_json::from_str("{}").unwrap();
        assert!(page.media_items.is_none());
        assert!(page.next_token().is_none());
    }

    #[test]
    fn test_empty_token_ends_paging() {
        let page: MediaPage =
            serde_json::from_str(r#"{"mediaItems": [], "nextPageToken": ""}"#).unwrap();
        assert_eq!(page.media_items, Some(Vec::new()));
        assert!(page.next_token().is_none());
    }
}
