//! Media item models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A photo or video in the user's library.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Link to the item in the Photos web UI.
    #[serde(default)]
    pub product_url: String,

    /// Short-lived URL of the item's bytes.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub mime_type: String,

    #[serde(default)]
    pub filename: String,

    #[serde(default)]
    pub media_metadata: MediaMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_info: Option<ContributorInfo>,
}

impl MediaItem {
    /// Whether the item is a video.
    ///
    /// Uses the metadata when present, the MIME type otherwise.
    pub fn is_video(&self) -> bool {
        self.media_metadata.video.is_some() || self.mime_type.starts_with("video/")
    }

    /// URL returning the original bytes: `=dv` for videos, `=d` otherwise.
    pub fn download_url(&self) -> String {
        if self.is_video() {
            format!("{}=dv", self.base_url)
        } else {
            format!("{}=d", self.base_url)
        }
    }

    /// Parsed creation time, if present and well formed.
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.media_metadata.creation_time()
    }
}

/// Metadata common to photos and videos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// RFC 3339 timestamp of when the item was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    /// Pixel width, sent as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    /// Pixel height, sent as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMetadata>,
}

impl MediaMetadata {
    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn width_px(&self) -> Option<u64> {
        self.width.as_deref().and_then(|w| w.parse().ok())
    }

    pub fn height_px(&self) -> Option<u64> {
        self.height.as_deref().and_then(|h| h.parse().ok())
    }
}

/// Camera details of a photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture_f_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_equivalent: Option<u32>,
    /// Exposure duration such as `"0.008s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<String>,
}

/// Details of a video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Processing status, `READY` once playable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Who added an item to a shared album.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContributorInfo {
    #[serde(default)]
    pub profile_picture_base_url: String,
    #[serde(default)]
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PHOTO_JSON: &str = r#"{
        "id": "AF1QipN",
        "productUrl": "https://photos.google.com/lr/photo/AF1QipN",
        "baseUrl": "https://lh3.googleusercontent.com/lr/AF1QipN",
        "mimeType": "image/jpeg",
        "filename": "IMG_0001.JPG",
        "mediaMetadata": {
            "creationTime": "2023-01-14T09:12:45Z",
            "width": "4032",
            "height": "3024",
            "photo": {
                "cameraMake": "Apple",
                "cameraModel": "iPhone 12",
                "focalLength": 4.2,
                "apertureFNumber": 1.6,
                "isoEquivalent": 32,
                "exposureTime": "0.001s"
            }
        }
    }"#;

    #[test]
    fn test_parse_photo() {
        let item: MediaItem = serde_json::from_str(PHOTO_JSON).unwrap();

        assert_eq!(item.filename, "IMG_0001.JPG");
        assert!(!item.is_video());
        assert_eq!(item.media_metadata.width_px(), Some(4032));
        assert_eq!(
            item.creation_time(),
            Some(Utc.with_ymd_and_hms(2023, 1, 14, 9, 12, 45).unwrap())
        );
        let photo = item.media_metadata.photo.as_ref().unwrap();
        assert_eq!(photo.camera_model.as_deref(), Some("iPhone 12"));
        assert_eq!(photo.iso_equivalent, Some(32));
    }

    #[test]
    fn test_download_url_suffix() {
        let photo: MediaItem = serde_json::from_str(PHOTO_JSON).unwrap();
        assert_eq!(
            photo.download_url(),
            "https://lh3.googleusercontent.com/lr/AF1QipN=d"
        );

        let video = MediaItem {
            base_url: "https://lh3.googleusercontent.com/lr/VID".to_string(),
            mime_type: "video/mp4".to_string(),
            ..Default::default()
        };
        assert_eq!(
            video.download_url(),
            "https://lh3.googleusercontent.com/lr/VID=dv"
        );
    }

    #[test]
    fn test_sparse_item() {
        let item: MediaItem = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(item.creation_time(), None);
        assert_eq!(item.media_metadata.height_px(), None);
    }

    #[test]
    fn test_creation_time_with_offset() {
        let meta = MediaMetadata {
            creation_time: Some("2023-01-14T10:12:45.500+01:00".to_string()),
            ..Default::default()
        };
        assert_eq!(
            meta.creation_time().map(|t| t.timestamp()),
            Some(Utc.with_ymd_and_hms(2023, 1, 14, 9, 12, 45).unwrap().timestamp())
        );
    }
}
