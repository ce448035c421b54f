use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::types::{
    ActorIds, LoginRequest, LoginResponse, ParentUpdate, StudioRef, TagIds, AUTH_COOKIE,
};
use crate::catalog::error::{classify_status, with_single_retry};
use crate::catalog::page::Page;
use crate::catalog::payload::{
    Created, ImportedScene, MarkerImport, NamedEntity, NewActor, NewStudio, NewTag, SceneImport,
};
use crate::catalog::{DestId, DestinationCatalog, DestinationError};
use crate::providers::truncate_for_log;

const NO_BODY: Option<&()> = None;

#[derive(Debug, Clone, Copy)]
pub struct GoonhubSettings {
    pub timeout: Duration,
    /// Wait before the single retry of a 5xx response.
    pub retry_delay: Duration,
    /// Page size for list endpoints.
    pub page_limit: u32,
}

impl Default for GoonhubSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(2000),
            page_limit: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoonhubClient {
    base_url: String,
    http: Client,
    token: Option<String>,
    settings: GoonhubSettings,
}

impl GoonhubClient {
    pub fn new(base_url: &str, settings: GoonhubSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("catalog-migrate/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .context("failed to build goonhub http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_once<B>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, DestinationError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut req = self
            .http
            .request(method.clone(), self.url(path))
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        match classify_status(status, &text) {
            Some(err) => Err(err),
            None => Ok(text),
        }
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, DestinationError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let what = format!("{method} {path}");
        debug!(request = %what, "goonhub request");
        with_single_retry(self.settings.retry_delay, &what, || {
            self.send_once(&method, path, body)
        })
        .await
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, DestinationError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            DestinationError::Decode(format!("{path}: {e}: {}", truncate_for_log(text, 300)))
        })
    }

    async fn list_all(&self, path: &str, what: &str) -> Result<Vec<NamedEntity>> {
        let limit = self.settings.page_limit;
        let mut out = Vec::new();
        let mut page = 1u32;
        loop {
            let paged = format!("{path}?page={page}&limit={limit}");
            let resp: Page<NamedEntity> = self
                .call(Method::GET, &paged, NO_BODY)
                .await
                .with_context(|| format!("failed to list {what}"))?;
            let more = resp.has_more(page, limit);
            out.extend(resp.data);
            if !more {
                break;
            }
            page += 1;
        }
        debug!(what, count = out.len(), pages = page, "listed destination entities");
        Ok(out)
    }
}

/// Session token from a login response: the auth cookie when present,
/// otherwise a `token` field in the JSON body.
fn session_token<'a, I>(set_cookies: I, body: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let from_cookie = set_cookies.into_iter().find_map(|header| {
        let pair = header.split(';').next().unwrap_or_default().trim();
        let (name, value) = pair.split_once('=')?;
        let value = value.trim().trim_matches('"');
        (name.trim() == AUTH_COOKIE && !value.is_empty()).then(|| value.to_string())
    });
    from_cookie.or_else(|| {
        serde_json::from_str::<LoginResponse>(body)
            .ok()
            .and_then(|r| r.token)
            .filter(|t| !t.is_empty())
    })
}

#[async_trait]
impl DestinationCatalog for GoonhubClient {
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/api/v1/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .context("login request failed")?;
        let status = resp.status();
        let cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = resp
            .text()
            .await
            .context("failed to read login response")?;
        if !status.is_success() {
            bail!(
                "login failed with status {status}: {}",
                truncate_for_log(body, 300)
            );
        }

        let Some(token) = session_token(cookies.iter().map(String::as_str), &body) else {
            bail!("login succeeded but no auth cookie or token was returned");
        };
        self.token = Some(token);
        info!(username, "authenticated with destination");
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<NamedEntity>> {
        self.list_all("/api/v1/tags", "tags").await
    }

    async fn create_tag(&self, req: &NewTag) -> Result<Created, DestinationError> {
        self.call(Method::POST, "/api/v1/tags", Some(req)).await
    }

    async fn list_studios(&self) -> Result<Vec<NamedEntity>> {
        self.list_all("/api/v1/studios", "studios").await
    }

    async fn create_studio(&self, req: &NewStudio) -> Result<Created, DestinationError> {
        self.call(Method::POST, "/api/v1/admin/studios", Some(req))
            .await
    }

    async fn update_studio_parent(
        &self,
        studio_id: DestId,
        parent_id: DestId,
    ) -> Result<(), DestinationError> {
        let path = format!("/api/v1/admin/studios/{studio_id}");
        self.send(Method::PUT, &path, Some(&ParentUpdate { parent_id }))
            .await
            .map(drop)
    }

    async fn list_actors(&self) -> Result<Vec<NamedEntity>> {
        self.list_all("/api/v1/actors", "actors").await
    }

    async fn create_actor(&self, req: &NewActor) -> Result<Created, DestinationError> {
        self.call(Method::POST, "/api/v1/admin/actors", Some(req))
            .await
    }

    async fn import_scene(&self, req: &SceneImport) -> Result<ImportedScene, DestinationError> {
        self.call(Method::POST, "/api/v1/admin/import/scenes", Some(req))
            .await
    }

    async fn set_scene_tags(
        &self,
        scene_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        let path = format!("/api/v1/scenes/{scene_id}/tags");
        self.send(Method::PUT, &path, Some(&TagIds { tag_ids }))
            .await
            .map(drop)
    }

    async fn set_scene_actors(
        &self,
        scene_id: DestId,
        actor_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        let path = format!("/api/v1/scenes/{scene_id}/actors");
        self.send(Method::PUT, &path, Some(&ActorIds { actor_ids }))
            .await
            .map(drop)
    }

    async fn set_scene_studio(
        &self,
        scene_id: DestId,
        studio_id: DestId,
    ) -> Result<(), DestinationError> {
        let path = format!("/api/v1/scenes/{scene_id}/studio");
        self.send(Method::PUT, &path, Some(&StudioRef { studio_id }))
            .await
            .map(drop)
    }

    async fn import_marker(&self, req: &MarkerImport) -> Result<Created, DestinationError> {
        self.call(Method::POST, "/api/v1/admin/import/markers", Some(req))
            .await
    }

    async fn set_marker_tags(
        &self,
        marker_id: DestId,
        tag_ids: &[DestId],
    ) -> Result<(), DestinationError> {
        let path = format!("/api/v1/markers/{marker_id}/tags");
        self.send(Method::PUT, &path, Some(&TagIds { tag_ids }))
            .await
            .map(drop)
    }
}
