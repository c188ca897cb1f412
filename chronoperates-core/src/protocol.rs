//! Wire types for the extraction backend.
//!
//! The backend exposes two endpoints relative to the API base URL:
//! - `POST /upload-image` takes a multipart body with a single `file` field
//!   and answers with an [`ExtractionResult`] or an [`ErrorBody`].
//! - `GET /download-ics?file_path=<locator>` answers with raw `text/calendar` bytes.

use serde::{Deserialize, Serialize};

pub const UPLOAD_PATH: &str = "upload-image";
pub const DOWNLOAD_PATH: &str = "download-ics";

/// Multipart field carrying the image bytes.
pub const UPLOAD_FIELD: &str = "file";

/// Shown when the backend gives no usable error detail.
pub const GENERIC_UPLOAD_ERROR: &str = "Failed to process image";

/// File name used for every calendar file handed to the platform.
pub const ICS_FILE_NAME: &str = "calendar_events.ics";
pub const ICS_MEDIA_TYPE: &str = "text/calendar";

/// Successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Backend-side locator for the generated calendar file. Opaque to the
    /// client and passed back verbatim on retrieval.
    pub ics_file_path: String,
    pub events_found: u32,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

impl ExtractionResult {
    /// Raw text recovered from the image, if the backend returned any.
    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref().filter(|text| !text.is_empty())
    }

    /// "Found 1 calendar event" / "Found 3 calendar events"
    pub fn summary_line(&self) -> String {
        let noun = if self.events_found == 1 { "event" } else { "events" };
        format!("Found {} calendar {}", self.events_found, noun)
    }
}

/// Error body returned with non-2xx upload responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_upload_response_and_ignores_extra_fields() {
        let body = r#"{
            "ics_content": "BEGIN:VCALENDAR\nEND:VCALENDAR",
            "ics_file_path": "/tmp/events_abc123.ics",
            "extracted_text": "Lunch at noon",
            "events_found": 3
        }"#;

        let result: ExtractionResult = serde_json::from_str(body).unwrap();

        assert_eq!(result.ics_file_path, "/tmp/events_abc123.ics");
        assert_eq!(result.events_found, 3);
        assert_eq!(result.extracted_text(), Some("Lunch at noon"));
    }

    #[test]
    fn test_null_and_empty_extracted_text_are_absent() {
        let null_text: ExtractionResult = serde_json::from_str(
            r#"{"ics_file_path": "/tmp/x.ics", "events_found": 0, "extracted_text": null}"#,
        )
        .unwrap();
        let empty_text: ExtractionResult = serde_json::from_str(
            r#"{"ics_file_path": "/tmp/x.ics", "events_found": 0, "extracted_text": ""}"#,
        )
        .unwrap();

        assert_eq!(null_text.extracted_text(), None);
        assert_eq!(empty_text.extracted_text(), None);
    }

    #[test]
    fn test_negative_event_count_is_rejected() {
        let parsed = serde_json::from_str::<ExtractionResult>(
            r#"{"ics_file_path": "/tmp/x.ics", "events_found": -1, "extracted_text": ""}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_summary_line_pluralizes() {
        let mut result = ExtractionResult {
            ics_file_path: "/tmp/x.ics".into(),
            events_found: 1,
            extracted_text: None,
        };
        assert_eq!(result.summary_line(), "Found 1 calendar event");

        result.events_found = 2;
        assert_eq!(result.summary_line(), "Found 2 calendar events");

        result.events_found = 0;
        assert_eq!(result.summary_line(), "Found 0 calendar events");
    }
}
