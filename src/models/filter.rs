//! Search request bodies for `mediaItems:search`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PhotosError, Result};

/// A calendar date as the Library API expects it.
///
/// A zero month or day acts as a wildcard ("any month of 2023").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub fn parse(date_str: &str) -> Result<Self> {
        let invalid = || PhotosError::InvalidDate(date_str.to_string());
        let parts: Vec<&str> = date_str.trim().split('-').collect();

        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: u32 = match parts.get(1) {
            Some(m) => m.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let day: u32 = match parts.get(2) {
            Some(d) => d.parse().map_err(|_| invalid())?,
            None => 0,
        };

        if !(1..=9999).contains(&year) || month > 12 || day > 31 {
            return Err(invalid());
        }

        Ok(Self { year, month, day })
    }
}

impl FromStr for Date {
    type Err = PhotosError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.month, self.day) {
            (0, _) => write!(f, "{:04}", self.year),
            (m, 0) => write!(f, "{:04}-{:02}", self.year, m),
            (m, d) => write!(f, "{:04}-{:02}-{:02}", self.year, m, d),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Date,
    pub end_date: Date,
}

impl DateRange {
    /// Create a range, rejecting one that ends before it starts.
    pub fn new(start_date: Date, end_date: Date) -> Result<Self> {
        let key = |d: &Date| (d.year, d.month, d.day);
        if key(&end_date) < key(&start_date) {
            return Err(PhotosError::InvalidDate(format!(
                "range ends ({}) before it starts ({})",
                end_date, start_date
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<Date>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<DateRange>,
}

/// Media types accepted by `mediaTypeFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    AllMedia,
    Photo,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeFilter {
    pub media_types: Vec<MediaType>,
}

/// The `filters` object of a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<DateFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type_filter: Option<MediaTypeFilter>,
}

impl Filters {
    /// Filter on a single date range.
    pub fn date_range(range: DateRange) -> Self {
        Self {
            date_filter: Some(DateFilter {
                dates: Vec::new(),
                ranges: vec![range],
            }),
            media_type_filter: None,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type_filter = Some(MediaTypeFilter {
            media_types: vec![media_type],
        });
        self
    }
}

/// Body of a `mediaItems:search` call.
///
/// `pageToken` is always sent, as `null` on the first page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page_size: u32,
    pub page_token: Option<String>,
    pub filters: Filters,
}

impl SearchRequest {
    pub fn new(filters: Filters, page_size: u32) -> Self {
        Self {
            page_size,
            page_token: None,
            filters,
        }
    }

    /// The same search, positioned at another page.
    pub fn at_page(&self, page_token: Option<String>) -> Self {
        Self {
            page_token,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date() {
        assert_eq!(Date::parse("2023-01-26").unwrap(), Date::new(2023, 1, 26));
        assert_eq!(Date::parse("2023-01").unwrap(), Date::new(2023, 1, 0));
        assert_eq!(Date::parse("2023").unwrap(), Date::new(2023, 0, 0));
        assert!(Date::parse("2023-13-01").is_err());
        assert!(Date::parse("yesterday").is_err());
        assert!(Date::parse("2023-01-02-03").is_err());
    }

    #[test]
    fn test_date_display() {
        assert_eq!(Date::new(2023, 1, 5).to_string(), "2023-01-05");
        assert_eq!(Date::new(2023, 7, 0).to_string(), "2023-07");
        assert_eq!(Date::new(2023, 0, 0).to_string(), "2023");
    }

    #[test]
    fn test_range_order() {
        assert!(DateRange::new(Date::new(2023, 1, 26), Date::new(2023, 1, 1)).is_err());
        assert!(DateRange::new(Date::new(2023, 1, 1), Date::new(2023, 1, 1)).is_ok());
    }

    #[test]
    fn test_search_body_shape() {
        let range = DateRange::new(Date::new(2023, 1, 1), Date::new(2023, 1, 26)).unwrap();
        let request = SearchRequest::new(Filters::date_range(range), 100);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "pageSize": 100,
                "pageToken": null,
                "filters": {
                    "dateFilter": {
                        "ranges": [{
                            "startDate": {"year": 2023, "month": 1, "day": 1},
                            "endDate": {"year": 2023, "month": 1, "day": 26}
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn test_media_type_filter() {
        let filters = Filters::default().with_media_type(MediaType::Video);
        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!({"mediaTypeFilter": {"mediaTypes": ["VIDEO"]}})
        );
    }

    #[test]
    fn test_at_page_keeps_filters() {
        let request = SearchRequest::new(Filters::default(), 50);
        let next = request.at_page(Some("token-2".to_string()));
        assert_eq!(next.page_token.as_deref(), Some("token-2"));
        assert_eq!(next.page_size, 50);
    }
}
