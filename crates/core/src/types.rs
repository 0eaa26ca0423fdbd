//! Core data model: anchors, comments and threads.
//!
//! Wire form is camelCase JSON so that anchors embedded in thread
//! trailers stay readable next to the rest of the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Viewport dimensions at anchor capture time. Informational only; the
/// resolver always measures the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Portable description of a screen position, usable to recompute that
/// position on a possibly-changed page.
///
/// Immutable once created. Offsets are relative to the anchored
/// element's bounding box at capture time and are deliberately
/// unclamped: a click measured against a stale rect may land outside
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinAnchor {
    pub selector: String,
    pub offset_x_percent: f64,
    pub offset_y_percent: f64,
    pub page_x_percent: f64,
    pub page_y_percent: f64,
    pub pathname: String,
    pub viewport: Viewport,
}

/// Parse an anchor out of untyped JSON.
///
/// Every key must be present for the record to be well-formed; partial
/// records yield `None`.
pub fn parse_anchor(value: &serde_json::Value) -> Option<PinAnchor> {
    serde_json::from_value(value.clone()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub avatar_url: String,
}

/// One reply in a thread. Owned by its thread, never persisted alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Back-reference to the owning thread, non-owning.
    pub thread_id: String,
    pub author: Author,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Vestigial: resolution lives on the thread.
    pub resolved: bool,
}

/// A pin plus its ordered comment replies.
///
/// A thread with zero comments is considered deleted and must not be
/// persisted; the storage adapters enforce this on comment deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub anchor: PinAnchor,
    pub comments: Vec<Comment>,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_anchor() -> PinAnchor {
        PinAnchor {
            selector: "#app".to_string(),
            offset_x_percent: 0.25,
            offset_y_percent: 0.5,
            page_x_percent: 0.2,
            page_y_percent: 0.4,
            pathname: "/docs".to_string(),
            viewport: Viewport {
                width: 1000,
                height: 800,
            },
        }
    }

    #[test]
    fn anchor_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample_anchor()).unwrap();
        assert_eq!(value["selector"], "#app");
        assert_eq!(value["offsetXPercent"], 0.25);
        assert_eq!(value["pageYPercent"], 0.4);
        assert_eq!(value["viewport"]["width"], 1000);
    }

    #[test]
    fn anchor_round_trips_through_json() {
        let anchor = sample_anchor();
        let raw = serde_json::to_string(&anchor).unwrap();
        let back: PinAnchor = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, anchor);
    }

    #[test]
    fn parse_anchor_accepts_complete_records() {
        let value = serde_json::to_value(sample_anchor()).unwrap();
        assert_eq!(parse_anchor(&value), Some(sample_anchor()));
    }

    #[test]
    fn parse_anchor_rejects_partial_records() {
        let mut value = serde_json::to_value(sample_anchor()).unwrap();
        value.as_object_mut().unwrap().remove("pageXPercent");
        assert_eq!(parse_anchor(&value), None);
    }

    #[test]
    fn parse_anchor_rejects_non_objects() {
        assert_eq!(parse_anchor(&serde_json::json!("#app")), None);
        assert_eq!(parse_anchor(&serde_json::Value::Null), None);
    }
}
