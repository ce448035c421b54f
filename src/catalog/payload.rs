//! Destination-side request and response shapes.

use serde::{Deserialize, Serialize};

use super::id_map::DestId;

/// Minimal listing row used for name dedup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedEntity {
    pub id: DestId,
    #[serde(default)]
    pub name: String,
}

/// Response of any create/import call; only the id matters to the importer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: DestId,
}

/// A create/import response that names the new destination entity.
pub trait Identified {
    fn dest_id(&self) -> DestId;
}

impl Identified for Created {
    fn dest_id(&self) -> DestId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewStudio {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewActor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tattoos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piercings: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fake_boobs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneImport {
    pub title: String,
    pub stored_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub original_filename: String,
    pub size: i64,
    pub duration: i64,
    pub width: i64,
    pub height: i64,
    pub frame_rate: f64,
    pub bit_rate: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub video_codec: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub audio_codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_id: Option<DestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path_id: Option<u64>,
    pub origin: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_file_check: bool,
}

/// Response of a scene import. `studio_id` is reported by destinations that
/// link the studio during import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportedScene {
    pub id: DestId,
    #[serde(default)]
    pub studio_id: Option<DestId>,
}

impl Identified for ImportedScene {
    fn dest_id(&self) -> DestId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerImport {
    pub scene_id: DestId,
    pub user_id: u64,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub color: String,
}
