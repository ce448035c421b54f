//! Source-side entities as the source catalog hands them out.
//!
//! Field names follow the source's GraphQL schema; absent values are `None`
//! rather than empty strings so the destination payload can omit them.

use serde::{Deserialize, Deserializer};

/// GraphQL hands out `null` for empty lists and scalars; treat it as the default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reference to another source entity by id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceTag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceStudio {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rating100: Option<i64>,
    #[serde(default)]
    pub parent_studio: Option<IdRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcePerformer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub height_cm: Option<i64>,
    #[serde(default)]
    pub measurements: Option<String>,
    #[serde(default)]
    pub fake_tits: Option<String>,
    #[serde(default)]
    pub tattoos: Option<String>,
    #[serde(default)]
    pub piercings: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub weight: Option<i64>,
}

/// One backing file of a scene; only technical metadata is carried.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default, deserialize_with = "null_default")]
    pub basename: String,
    #[serde(default, deserialize_with = "null_default")]
    pub size: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub width: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub height: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub video_codec: String,
    #[serde(default, deserialize_with = "null_default")]
    pub audio_codec: String,
    #[serde(default, deserialize_with = "null_default")]
    pub frame_rate: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub bit_rate: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceMarker {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub seconds: f64,
    #[serde(default)]
    pub primary_tag: Option<IdRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<IdRef>,
}

impl SourceMarker {
    /// Primary tag followed by the additional tags, duplicates removed.
    pub fn tag_refs(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.tags.len() + 1);
        for r in self.primary_tag.iter().chain(self.tags.iter()) {
            if !out.contains(&r.id.as_str()) {
                out.push(r.id.as_str());
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceScene {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub studio: Option<IdRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub performers: Vec<IdRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<IdRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub scene_markers: Vec<SourceMarker>,
}

impl SourceScene {
    /// Title to import under: the scene's own title, else the first file's basename.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self
                .files
                .first()
                .map(|f| f.basename.clone())
                .unwrap_or_default(),
        }
    }
}

/// Complete snapshot of the source catalog, fetched once before any phase runs.
#[derive(Debug, Clone, Default)]
pub struct SourceInventory {
    pub tags: Vec<SourceTag>,
    pub studios: Vec<SourceStudio>,
    pub performers: Vec<SourcePerformer>,
    pub scenes: Vec<SourceScene>,
}

impl SourceInventory {
    pub fn marker_count(&self) -> usize {
        self.scenes.iter().map(|s| s.scene_markers.len()).sum()
    }

    /// Keep only the first `limit` scenes in inventory order.
    pub fn limit_scenes(&mut self, limit: usize) {
        self.scenes.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_tags_union_primary_and_additional() {
        let marker = SourceMarker {
            id: "m1".into(),
            primary_tag: Some(IdRef::new("7")),
            tags: vec![IdRef::new("3"), IdRef::new("7"), IdRef::new("9")],
            ..Default::default()
        };
        assert_eq!(marker.tag_refs(), vec!["7", "3", "9"]);
    }

    #[test]
    fn title_falls_back_to_basename() {
        let scene = SourceScene {
            id: "1".into(),
            title: Some("  ".into()),
            files: vec![SourceFile {
                path: "/mnt/media/clip.mp4".into(),
                basename: "clip.mp4".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(scene.display_title(), "clip.mp4");

        let titled = SourceScene {
            title: Some("Opening".into()),
            ..scene
        };
        assert_eq!(titled.display_title(), "Opening");
    }

    #[test]
    fn decodes_scene_with_nulls() {
        let raw = serde_json::json!({
            "id": "12",
            "title": null,
            "details": null,
            "date": "2021-04-01",
            "files": [{"path": "/a/b.mp4", "basename": "b.mp4", "size": 10, "duration": 61.6,
                        "width": 1920, "height": 1080, "video_codec": "h264", "audio_codec": "aac",
                        "frame_rate": 29.97, "bit_rate": 4000}],
            "studio": null,
            "performers": [{"id": "4"}],
            "tags": [],
            "scene_markers": [{"id": "m", "title": "t", "seconds": 12.9, "primary_tag": null, "tags": []}]
        });
        let scene: SourceScene = serde_json::from_value(raw).unwrap();
        assert!(scene.studio.is_none());
        assert_eq!(scene.performers, vec![IdRef::new("4")]);
        assert_eq!(scene.scene_markers.len(), 1);
        assert_eq!(scene.files[0].width, 1920);
    }
}
