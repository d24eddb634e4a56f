//! Photos Library API client.
//!
//! This module provides a client for the media item endpoints of the
//! Library API (photoslibrary.googleapis.com). Every call is authorized with
//! a bearer access token.

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::pagination::{collect_pages, Listing};
use crate::config::clamp_page_size;
use crate::error::{PhotosError, Result};
use crate::models::{Filters, MediaItem, MediaPage, SearchRequest};

/// Base URL for the Library API.
const API_BASE_URL: &str = "https://photoslibrary.googleapis.com/";

/// Media item client.
///
/// # Example
///
/// ```rust,no_run
/// use photoscoop::PhotosApi;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = PhotosApi::new(reqwest::Client::new(), "ya29.access-token");
///     let listing = api.list_all(100).await?;
///     println!("{} items", listing.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PhotosApi {
    client: Client,
    base_url: String,
    access_token: String,
}

impl PhotosApi {
    /// Create a client for the public endpoint.
    pub fn new<S: Into<String>>(client: Client, access_token: S) -> Self {
        Self::with_base_url(client, API_BASE_URL, access_token)
    }

    /// Create a client against another endpoint (e.g. a test server).
    pub fn with_base_url<B: Into<String>, S: Into<String>>(
        client: Client,
        base_url: B,
        access_token: S,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            client,
            base_url,
            access_token: access_token.into(),
        }
    }

    /// Read a response body, turning non-success statuses into `HttpStatus`.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Photos API returned {}: {}", status, text);
            return Err(PhotosError::HttpStatus(status.as_u16(), text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch one page of a date/media-type search.
    pub async fn search_page(&self, request: &SearchRequest) -> Result<MediaPage> {
        let url = format!("{}v1/mediaItems:search", self.base_url);
        debug!("POST {} page_token={:?}", url, request.page_token);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Fetch one page of the whole library, newest first.
    pub async fn list_page(&self, page_size: u32, page_token: Option<&str>) -> Result<MediaPage> {
        let url = format!("{}v1/mediaItems", self.base_url);
        debug!("GET {} page_token={:?}", url, page_token);

        let page_size = clamp_page_size(page_size).to_string();
        let mut params = vec![("pageSize", page_size.as_str())];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Get a single media item by ID.
    ///
    /// Useful for renewing an expired `baseUrl`.
    pub async fn get_media_item(&self, media_item_id: &str) -> Result<MediaItem> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PhotosError::ApiError(format!("invalid base URL: {}", e)))?;
        // The ID is one path segment, whatever characters it holds.
        url.path_segments_mut()
            .map_err(|_| PhotosError::ApiError(format!("cannot append to {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "mediaItems", media_item_id]);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Collect every page of a search.
    pub async fn search_all(&self, filters: Filters, page_size: u32) -> Result<Listing> {
        let request = SearchRequest::new(filters, clamp_page_size(page_size));

        collect_pages(|token| {
            let request = request.at_page(token);
            async move { self.search_page(&request).await }
        })
        .await
    }

    /// Collect every page of the library listing.
    pub async fn list_all(&self, page_size: u32) -> Result<Listing> {
        collect_pages(|token| async move { self.list_page(page_size, token.as_deref()).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Date, DateRange};
    use mockito::Matcher;
    use serde_json::json;

    fn items_json(ids: &[&str]) -> serde_json::Value {
        json!(ids
            .iter()
            .map(|id| json!({
                "id": id,
                "baseUrl": format!("https://lh3.example.com/{}", id),
                "mimeType": "image/jpeg",
                "filename": format!("{}.jpg", id),
                "mediaMetadata": {"creationTime": "2023-01-10T08:00:00Z", "width": "10", "height": "20"}
            }))
            .collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_search_all_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1/mediaItems:search")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(json!({
                "pageSize": 100,
                "pageToken": null,
                "filters": {"dateFilter": {"ranges": [{
                    "startDate": {"year": 2023, "month": 1, "day": 1},
                    "endDate": {"year": 2023, "month": 1, "day": 26}
                }]}}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"mediaItems": items_json(&["a", "b"]), "nextPageToken": "page-2"}).to_string())
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1/mediaItems:search")
            .match_body(Matcher::PartialJson(json!({"pageToken": "page-2"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"mediaItems": items_json(&["c"])}).to_string())
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let range = DateRange::new(Date::new(2023, 1, 1), Date::new(2023, 1, 26)).unwrap();
        let listing = api.search_all(Filters::date_range(range), 100).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.pages, 2);
        assert!(listing.is_complete());
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/mediaItems:search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let listing = api.search_all(Filters::default(), 100).await.unwrap();

        assert!(listing.is_empty());
        assert!(!listing.is_complete());
    }

    #[tokio::test]
    async fn test_list_all_stops_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Regex("^pageSize=50$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"mediaItems": items_json(&["a"]), "nextPageToken": "p2"}).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/v1/mediaItems")
            .match_query(Matcher::Regex("^pageSize=50&pageToken=p2$".to_string()))
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "status": "UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let listing = api.list_all(50).await.unwrap();

        assert_eq!(listing.len(), 1);
        assert!(listing.stopped.unwrap().starts_with("HTTP 401"));
    }

    #[tokio::test]
    async fn test_get_media_item() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/mediaItems/abc")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": "abc", "filename": "abc.jpg", "mimeType": "image/jpeg"}).to_string())
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let item = api.get_media_item("abc").await.unwrap();

        assert_eq!(item.filename, "abc.jpg");
    }

    #[tokio::test]
    async fn test_get_media_item_escapes_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/mediaItems/a%2Fb%3Fc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": "a/b?c", "filename": "odd.jpg"}).to_string())
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let item = api.get_media_item("a/b?c").await.unwrap();

        mock.assert_async().await;
        assert_eq!(item.id, "a/b?c");
    }

    #[tokio::test]
    async fn test_get_missing_item_is_http_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/mediaItems/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let api = PhotosApi::with_base_url(Client::new(), server.url(), "test-token");
        let err = api.get_media_item("missing").await.unwrap_err();

        assert!(matches!(err, PhotosError::HttpStatus(404, _)));
    }
}
