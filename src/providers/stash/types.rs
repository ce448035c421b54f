use serde::{Deserialize, Serialize};

use crate::catalog::model::{SourcePerformer, SourceScene, SourceStudio, SourceTag};

#[derive(Debug, Serialize)]
pub(super) struct GraphqlRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphqlError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FindTagsData {
    pub find_tags: TagList,
}

#[derive(Debug, Deserialize)]
pub(super) struct TagList {
    #[serde(default)]
    pub tags: Vec<SourceTag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FindStudiosData {
    pub find_studios: StudioList,
}

#[derive(Debug, Deserialize)]
pub(super) struct StudioList {
    #[serde(default)]
    pub studios: Vec<SourceStudio>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FindPerformersData {
    pub find_performers: PerformerList,
}

#[derive(Debug, Deserialize)]
pub(super) struct PerformerList {
    #[serde(default)]
    pub performers: Vec<SourcePerformer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FindScenesData {
    pub find_scenes: SceneList,
}

#[derive(Debug, Deserialize)]
pub(super) struct SceneList {
    #[serde(default)]
    pub scenes: Vec<SourceScene>,
}

pub(super) const TAGS_QUERY: &str = r#"{
  findTags(filter: { per_page: -1 }) {
    tags { id name }
  }
}"#;

pub(super) const STUDIOS_QUERY: &str = r#"{
  findStudios(filter: { per_page: -1 }) {
    studios {
      id
      name
      urls
      details
      rating100
      parent_studio { id }
    }
  }
}"#;

pub(super) const PERFORMERS_QUERY: &str = r#"{
  findPerformers(filter: { per_page: -1 }) {
    performers {
      id
      name
      gender
      birthdate
      death_date
      ethnicity
      country
      eye_color
      height_cm
      measurements
      fake_tits
      tattoos
      piercings
      hair_color
      weight
    }
  }
}"#;

pub(super) const SCENES_QUERY: &str = r#"{
  findScenes(filter: { per_page: -1 }) {
    scenes {
      id
      title
      details
      date
      files {
        path
        basename
        size
        duration
        width
        height
        video_codec
        audio_codec
        frame_rate
        bit_rate
      }
      studio { id }
      performers { id }
      tags { id }
      scene_markers {
        id
        title
        seconds
        primary_tag { id }
        tags { id }
      }
    }
  }
}"#;
