use serde::{Deserialize, Serialize};

use crate::catalog::DestId;

pub(super) const AUTH_COOKIE: &str = "goonhub_auth";

#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ParentUpdate {
    pub parent_id: DestId,
}

#[derive(Debug, Serialize)]
pub(super) struct TagIds<'a> {
    pub tag_ids: &'a [DestId],
}

#[derive(Debug, Serialize)]
pub(super) struct ActorIds<'a> {
    pub actor_ids: &'a [DestId],
}

#[derive(Debug, Serialize)]
pub(super) struct StudioRef {
    pub studio_id: DestId,
}
