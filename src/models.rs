use serde::Deserialize;
use serde_json::{Map, Value};

/// One raw analytics row. The upstream column layout is not stable, so rows
/// stay dynamic until normalization.
pub type Record = Map<String, Value>;

/// A PAD card shaped for rendering. Every field is resolved through column
/// fallbacks, so a `Card` is always fully populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub sample_id: Option<i64>,
    pub sample_name: String,
    pub project_name: String,
    pub user_name: String,
    pub date_of_creation: String,
    pub quantity: Option<f64>,
    pub notes: Option<Notes>,
    pub image_url: Option<String>,
    pub camera_type: Option<String>,
}

/// Model-prediction metadata embedded in a card's notes field as a JSON
/// blob. When the blob does not parse, only `raw` is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Notes {
    #[serde(rename = "Phone ID")]
    pub phone_id: Option<String>,

    #[serde(rename = "User")]
    pub user: Option<String>,

    #[serde(rename = "App type")]
    pub app_type: Option<String>,

    #[serde(rename = "Build")]
    pub build: Option<i64>,

    #[serde(rename = "Neural net")]
    pub neural_net: Option<String>,

    #[serde(rename = "Predicted drug")]
    pub predicted_drug: Option<String>,

    #[serde(rename = "Prediction score")]
    pub prediction_score: Option<f64>,

    #[serde(rename = "Safe")]
    pub safe_status: Option<String>,

    #[serde(rename = "Quantity NN")]
    pub quantity_nn: Option<f64>,

    #[serde(rename = "Quantity PLS")]
    pub quantity_pls: Option<f64>,

    #[serde(rename = "PLS used")]
    pub pls_used: Option<bool>,

    #[serde(rename = "Notes")]
    pub notes_text: Option<String>,

    #[serde(skip)]
    pub raw: Option<String>,
}
