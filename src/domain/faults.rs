//! Fault records and the payloads that create them.

use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use url::Url;

use crate::domain::error::DomainError;

pub const UNTITLED_FAULT: &str = "Untitled fault";

/// Columns requested by the paginated fault list.
pub const LIST_COLUMNS: [&str; 7] = [
    "id",
    "created_at",
    "title",
    "description",
    "severity",
    "status",
    "photo_url",
];

/// Columns requested by the filtered report.
pub const REPORT_COLUMNS: [&str; 5] = ["id", "created_at", "title", "severity", "status"];

/// Row shape returned by the remote store, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FaultRow {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub photo_url: Option<String>,
}

/// A stored fault. Never mutated after it leaves the store.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultRecord {
    pub id: i64,
    pub created_at: Option<OffsetDateTime>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub photo_url: Option<String>,
}

impl FaultRecord {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED_FAULT)
    }

    /// How the stored photo URL may appear on the page.
    ///
    /// Relative references (storage paths) and any scheme other than the
    /// script-capable ones become links.
    pub fn photo_link(&self) -> PhotoLink<'_> {
        let Some(raw) = self.photo_url.as_deref() else {
            return PhotoLink::Absent;
        };
        match Url::parse(raw) {
            Ok(parsed) if SCRIPT_SCHEMES.contains(&parsed.scheme()) => PhotoLink::Blocked,
            _ => PhotoLink::Link(raw),
        }
    }
}

/// Schemes a browser would execute or inline instead of navigating to.
const SCRIPT_SCHEMES: [&str; 3] = ["javascript", "data", "vbscript"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoLink<'a> {
    Absent,
    Link(&'a str),
    /// A URL was stored but its scheme cannot be offered as a link.
    Blocked,
}

impl TryFrom<FaultRow> for FaultRecord {
    type Error = DomainError;

    fn try_from(row: FaultRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .ok_or_else(|| DomainError::validation("fault row is missing `id`"))?;

        Ok(Self {
            id,
            created_at: row.created_at.as_deref().and_then(parse_timestamp),
            title: non_blank(row.title),
            description: non_blank(row.description),
            severity: non_blank(row.severity),
            status: non_blank(row.status),
            photo_url: non_blank(row.photo_url),
        })
    }
}

/// Fields a user submits when logging a fault. Sent verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewFault {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub photo_url: String,
}

/// Parse a store timestamp, accepting offset-less values as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed);
    }

    // `timestamp without time zone` columns come back without an offset.
    let local = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    PrimitiveDateTime::parse(trimmed, &local)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row(id: Option<i64>) -> FaultRow {
        FaultRow {
            id,
            created_at: Some("2025-03-04T08:15:00.123456+00:00".into()),
            title: Some("Leak".into()),
            description: Some("".into()),
            severity: Some("high".into()),
            status: Some("open".into()),
            photo_url: Some("   ".into()),
        }
    }

    #[test]
    fn row_without_id_is_rejected() {
        let err = FaultRecord::try_from(row(None)).expect_err("missing id");
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn blank_fields_become_absent() {
        let record = FaultRecord::try_from(row(Some(7))).expect("valid row");
        assert_eq!(record.id, 7);
        assert_eq!(record.description, None);
        assert_eq!(record.photo_url, None);
        assert_eq!(record.display_title(), "Leak");
    }

    #[test]
    fn missing_title_falls_back() {
        let mut raw = row(Some(1));
        raw.title = None;
        let record = FaultRecord::try_from(raw).expect("valid row");
        assert_eq!(record.display_title(), UNTITLED_FAULT);
    }

    #[test]
    fn timestamps_parse_with_and_without_offset() {
        assert_eq!(
            parse_timestamp("2025-03-04T08:15:00+02:00"),
            Some(datetime!(2025-03-04 08:15:00 +02:00))
        );
        assert_eq!(
            parse_timestamp("2025-03-04T08:15:00.5"),
            Some(datetime!(2025-03-04 08:15:00.5 UTC))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    fn photo(url: &str) -> FaultRecord {
        let mut raw = row(Some(1));
        raw.photo_url = Some(url.into());
        FaultRecord::try_from(raw).expect("valid row")
    }

    #[test]
    fn present_photo_urls_become_links() {
        for url in [
            "https://cdn.example.com/p.jpg",
            "/storage/v1/object/public/photos/p.jpg",
            "photos/p.jpg",
            "ftp://files.example.com/p.jpg",
        ] {
            assert_eq!(photo(url).photo_link(), PhotoLink::Link(url), "{url}");
        }
    }

    #[test]
    fn script_schemes_are_blocked() {
        for url in [
            "javascript:alert(1)",
            " JavaScript:alert(1)",
            "java\tscript:alert(1)",
            "data:text/html,<b>x</b>",
            "vbscript:msgbox(1)",
        ] {
            assert_eq!(photo(url).photo_link(), PhotoLink::Blocked, "{url}");
        }
    }

    #[test]
    fn blank_photo_is_absent() {
        assert_eq!(photo("   ").photo_link(), PhotoLink::Absent);
    }
}
