//! Row normalization.
//!
//! The analytics API has drifted column names over the years, so each card
//! field resolves through an ordered candidate list instead of a fixed key.
//! The lists are data, not branches, so adding the next rename is a
//! one-line change.
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::models::{Card, Notes, Record};

/// Images are stored as server filesystem paths but served from here.
pub const PAD_BASE_URL: &str = "https://pad.crc.nd.edu";

pub const ID_COLUMNS: &[&str] = &["id", "card_id"];
pub const SAMPLE_ID_COLUMNS: &[&str] = &["sample_id"];
pub const SAMPLE_NAME_COLUMNS: &[&str] = &["sample_name", "sample_name.name", "drug_name"];
pub const PROJECT_NAME_COLUMNS: &[&str] = &["project.project_name", "project_name", "project.name"];
pub const USER_NAME_COLUMNS: &[&str] = &["user_name", "user_name.name", "user"];
pub const USER_MATCH_COLUMNS: &[&str] = &["user_name", "user"];
pub const DATE_COLUMNS: &[&str] = &["date_of_creation", "created_at", "date"];
pub const QUANTITY_COLUMNS: &[&str] = &["quantity", "concentration"];
pub const IMAGE_COLUMNS: &[&str] = &[
    "processed_file_location",
    "raw_file_location",
    "url",
    "image_url",
];
pub const NOTES_COLUMNS: &[&str] = &["notes", "note"];
pub const CAMERA_COLUMNS: &[&str] = &["camera_type_1", "camera_type"];

/// First present, non-null value among the candidate columns.
pub fn pick<'a>(record: &'a Record, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|col| record.get(*col))
        .find(|value| !value.is_null())
}

pub fn pick_string(record: &Record, candidates: &[&str]) -> Option<String> {
    pick(record, candidates).map(value_to_string)
}

pub fn pick_i64(record: &Record, candidates: &[&str]) -> Option<i64> {
    pick(record, candidates).and_then(|value| match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub fn pick_f64(record: &Record, candidates: &[&str]) -> Option<f64> {
    pick(record, candidates).and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// ISO-8601 in, `DD/MM/YYYY hh:mm AM/PM` out. Unparseable input passes
/// through unchanged so the page still shows whatever the API sent.
pub fn format_creation_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    parse_iso(raw)
        .map(|dt| dt.format("%d/%m/%Y %I:%M %p").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    // keep the wall-clock time of whatever offset the API sent
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Convert a stored server filesystem path into a public URL.
pub fn image_path_to_url(path: &str) -> String {
    let path = path.strip_prefix("/var/www/html").unwrap_or(path);

    if path.starts_with('/') {
        format!("{PAD_BASE_URL}{path}")
    } else {
        format!("{PAD_BASE_URL}/{path}")
    }
}

/// Parse the JSON notes blob. Anything that does not deserialize cleanly
/// falls back to a `Notes` carrying only the original string.
pub fn parse_notes(raw: &str) -> Notes {
    match serde_json::from_str::<Notes>(raw) {
        Ok(mut notes) => {
            // the capture app submits empty strings for untouched fields
            if notes.user.as_deref() == Some("") {
                notes.user = None;
            }
            if notes.notes_text.as_deref() == Some("") {
                notes.notes_text = None;
            }
            notes
        }
        Err(_) => Notes {
            raw: Some(raw.to_string()),
            ..Notes::default()
        },
    }
}

/// Normalize one raw row into a fully-populated `Card`.
pub fn card_from_record(record: &Record) -> Card {
    let image_path = pick_string(record, IMAGE_COLUMNS).filter(|p| !p.is_empty());
    let raw_notes = pick_string(record, NOTES_COLUMNS).filter(|n| !n.is_empty());

    Card {
        id: pick_i64(record, ID_COLUMNS).unwrap_or(0),
        sample_id: pick_i64(record, SAMPLE_ID_COLUMNS),
        sample_name: pick_string(record, SAMPLE_NAME_COLUMNS)
            .unwrap_or_else(|| "Unknown".to_string()),
        project_name: pick_string(record, PROJECT_NAME_COLUMNS)
            .unwrap_or_else(|| "Unknown".to_string()),
        user_name: pick_string(record, USER_NAME_COLUMNS).unwrap_or_else(|| "Unknown".to_string()),
        date_of_creation: format_creation_date(
            &pick_string(record, DATE_COLUMNS).unwrap_or_default(),
        ),
        quantity: pick_f64(record, QUANTITY_COLUMNS),
        notes: raw_notes.as_deref().map(parse_notes),
        image_url: image_path.as_deref().map(image_path_to_url),
        camera_type: pick_string(record, CAMERA_COLUMNS),
    }
}
