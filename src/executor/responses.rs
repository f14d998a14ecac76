/// JSON records returned to the tool-calling layer.
///
/// Every record carries a `status` of `"success"` or `"error"`; failures are
/// data, not panics, so the agent can read the message and retry.
use serde::{Deserialize, Serialize};

use crate::perception::extractor::ExtractionSession;
use crate::perception::types::ScreenElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl From<(i32, i32)> for Coordinates {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementsResponse {
    pub status: Status,
    pub element_count: usize,
    pub elements: Vec<ScreenElement>,
}

impl From<&ExtractionSession> for ElementsResponse {
    fn from(session: &ExtractionSession) -> Self {
        Self {
            status: Status::Success,
            element_count: session.len(),
            elements: session.elements().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub message: String,
    /// Zero for failed element listings; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_count: Option<usize>,
    /// Present (and empty) for element listings so consumers can always iterate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ScreenElement>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            element_count: None,
            elements: None,
        }
    }

    pub fn with_empty_elements(mut self) -> Self {
        self.element_count = Some(0);
        self.elements = Some(Vec::new());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapResponse {
    pub status: Status,
    pub action: String,
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapCellResponse {
    pub status: Status,
    pub action: String,
    pub cell: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateResponse {
    pub status: Status,
    pub cell: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveResponse {
    pub status: Status,
    pub screen_size: ScreenSize,
    pub grid: GridShape,
    pub grid_description: String,
    /// `data:image/png;base64,...`
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfoResponse {
    pub status: Status,
    pub screen_width: u32,
    pub screen_height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_listing_carries_zero_count_and_empty_elements() {
        let record = serde_json::to_value(ErrorResponse::new("bad xml").with_empty_elements()).unwrap();
        assert_eq!(
            record,
            serde_json::json!({
                "status": "error",
                "message": "bad xml",
                "element_count": 0,
                "elements": []
            })
        );
    }

    #[test]
    fn plain_error_has_no_listing_fields() {
        let record = serde_json::to_value(ErrorResponse::new("no such tool")).unwrap();
        assert!(record.get("element_count").is_none());
        assert!(record.get("elements").is_none());
    }
}
