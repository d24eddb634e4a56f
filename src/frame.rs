//! Flattened metadata tables.
//!
//! A [`MediaFrame`] holds one [`MediaRow`] per media item, with the nested
//! `mediaMetadata` fields pulled up into columns and the creation time parsed.

use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::models::MediaItem;

/// Column names, in display order.
pub const COLUMNS: [&str; 18] = [
    "id",
    "filename",
    "mimeType",
    "description",
    "productUrl",
    "baseUrl",
    "creationTime_metadata",
    "width",
    "height",
    "cameraMake",
    "cameraModel",
    "focalLength",
    "apertureFNumber",
    "isoEquivalent",
    "exposureTime",
    "fps",
    "status",
    "creationTime_metadata_dt",
];

/// One flattened media item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRow {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub description: Option<String>,
    pub product_url: String,
    pub base_url: String,
    /// `creationTime` exactly as the API sent it.
    pub creation_time_metadata: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub focal_length: Option<f64>,
    pub aperture_f_number: Option<f64>,
    pub iso_equivalent: Option<u32>,
    pub exposure_time: Option<String>,
    pub fps: Option<f64>,
    pub status: Option<String>,
    pub creation_time_metadata_dt: Option<DateTime<Utc>>,
}

impl MediaRow {
    pub fn from_item(item: &MediaItem) -> Self {
        let meta = &item.media_metadata;
        let photo = meta.photo.as_ref();
        let video = meta.video.as_ref();

        Self {
            id: item.id.clone(),
            filename: item.filename.clone(),
            mime_type: item.mime_type.clone(),
            description: item.description.clone(),
            product_url: item.product_url.clone(),
            base_url: item.base_url.clone(),
            creation_time_metadata: meta.creation_time.clone(),
            width: meta.width_px(),
            height: meta.height_px(),
            camera_make: photo
                .and_then(|p| p.camera_make.clone())
                .or_else(|| video.and_then(|v| v.camera_make.clone())),
            camera_model: photo
                .and_then(|p| p.camera_model.clone())
                .or_else(|| video.and_then(|v| v.camera_model.clone())),
            focal_length: photo.and_then(|p| p.focal_length),
            aperture_f_number: photo.and_then(|p| p.aperture_f_number),
            iso_equivalent: photo.and_then(|p| p.iso_equivalent),
            exposure_time: photo.and_then(|p| p.exposure_time.clone()),
            fps: video.and_then(|v| v.fps),
            status: video.and_then(|v| v.status.clone()),
            creation_time_metadata_dt: meta.creation_time(),
        }
    }

    /// Cell text for each of [`COLUMNS`]; missing values are empty.
    pub fn cells(&self) -> Vec<String> {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        vec![
            self.id.clone(),
            self.filename.clone(),
            self.mime_type.clone(),
            opt(&self.description),
            self.product_url.clone(),
            self.base_url.clone(),
            opt(&self.creation_time_metadata),
            opt(&self.width),
            opt(&self.height),
            opt(&self.camera_make),
            opt(&self.camera_model),
            opt(&self.focal_length),
            opt(&self.aperture_f_number),
            opt(&self.iso_equivalent),
            opt(&self.exposure_time),
            opt(&self.fps),
            opt(&self.status),
            self.creation_time_metadata_dt
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        ]
    }
}

/// A table of media items.
#[derive(Debug, Clone, Default)]
pub struct MediaFrame {
    rows: Vec<MediaRow>,
}

impl MediaFrame {
    pub fn from_items(items: &[MediaItem]) -> Self {
        Self {
            rows: items.iter().map(MediaRow::from_item).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MediaRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&MediaRow> {
        self.rows.get(index)
    }

    /// Render the first `n` rows under a header.
    pub fn head(&self, n: usize) -> Table {
        let mut table = new_table();
        table.set_header(COLUMNS.to_vec());
        for row in self.rows.iter().take(n) {
            table.add_row(row.cells());
        }
        table
    }

    /// Render one row as a field/value table.
    pub fn record(&self, index: usize) -> Option<Table> {
        let row = self.rows.get(index)?;

        let mut table = new_table();
        table.set_header(vec!["field", "value"]);
        for (column, value) in COLUMNS.iter().zip(row.cells()) {
            table.add_row(vec![column.to_string(), value]);
        }
        Some(table)
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
