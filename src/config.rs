//! Run configuration: environment (optionally from `.env`), CLI overrides,
//! and the path-mapping file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::catalog::PathRule;
use crate::providers::goonhub::GoonhubSettings;
use crate::util::env::{env_opt, parse_flag};

pub const REQUIRED_ENV: &[&str] = &[
    "STASH_BASE_URL",
    "STASH_API_KEY",
    "GOONHUB_BASE_URL",
    "GOONHUB_USERNAME",
    "GOONHUB_PASSWORD",
    "GOONHUB_MARKER_USER_ID",
];

/// Keys echoed (redacted) in the startup snapshot.
pub const LOGGED_ENV: &[&str] = &[
    "STASH_BASE_URL",
    "STASH_API_KEY",
    "GOONHUB_BASE_URL",
    "GOONHUB_USERNAME",
    "GOONHUB_PASSWORD",
    "GOONHUB_MARKER_USER_ID",
    "SCENE_LIMIT",
    "DRY_RUN",
    "SKIP_FILE_CHECK",
    "GOONHUB_RETRY_DELAY_MS",
    "GOONHUB_TIMEOUT_SECS",
    "STASH_TIMEOUT_SECS",
    "GOONHUB_PAGE_LIMIT",
];

const DEFAULT_MAPPINGS_FILE: &str = "mappings.json";
const DEFAULT_ID_MAP_FILE: &str = "id_map.json";

#[derive(Clone)]
pub struct Config {
    pub stash_base_url: String,
    pub stash_api_key: String,
    pub stash_timeout: Duration,
    pub goonhub_base_url: String,
    pub goonhub_username: String,
    pub goonhub_password: String,
    pub goonhub: GoonhubSettings,
    pub marker_user_id: u64,
    pub scene_limit: Option<usize>,
    pub dry_run: bool,
    pub skip_file_check: bool,
    pub mappings_file: PathBuf,
    pub id_map_file: PathBuf,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dry_run: bool,
    pub skip_file_check: bool,
    pub scene_limit: Option<usize>,
    pub mappings: Option<PathBuf>,
    pub id_map: Option<PathBuf>,
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| anyhow!("{key} is required"))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow!("{key}: invalid value {raw:?}: {e}")),
        }
    }

    fn positive(&self, key: &str) -> Result<Option<u64>> {
        match self.parsed::<u64>(key) {
            Ok(Some(0)) => bail!("{key} must be a positive integer"),
            Ok(v) => Ok(v),
            Err(e) => Err(e.context(format!("{key} must be a positive integer"))),
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.optional(key).is_some_and(|v| parse_flag(&v))
    }

    fn base_url(&self, key: &str) -> Result<String> {
        let raw = self.required(key)?;
        url::Url::parse(&raw).with_context(|| format!("{key} is not a valid URL"))?;
        Ok(raw.trim_end_matches('/').to_string())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_opt)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let defaults = GoonhubSettings::default();

        let marker_user_id = vars
            .positive("GOONHUB_MARKER_USER_ID")?
            .ok_or_else(|| anyhow!("GOONHUB_MARKER_USER_ID is required"))?;
        let scene_limit = vars
            .positive("SCENE_LIMIT")?
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX));

        let goonhub = GoonhubSettings {
            timeout: vars
                .parsed::<u64>("GOONHUB_TIMEOUT_SECS")?
                .map_or(defaults.timeout, Duration::from_secs),
            retry_delay: vars
                .parsed::<u64>("GOONHUB_RETRY_DELAY_MS")?
                .map_or(defaults.retry_delay, Duration::from_millis),
            page_limit: vars
                .parsed::<u32>("GOONHUB_PAGE_LIMIT")?
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_limit),
        };

        Ok(Self {
            stash_base_url: vars.base_url("STASH_BASE_URL")?,
            stash_api_key: vars.required("STASH_API_KEY")?,
            stash_timeout: Duration::from_secs(
                vars.parsed::<u64>("STASH_TIMEOUT_SECS")?.unwrap_or(60),
            ),
            goonhub_base_url: vars.base_url("GOONHUB_BASE_URL")?,
            goonhub_username: vars.required("GOONHUB_USERNAME")?,
            goonhub_password: vars.required("GOONHUB_PASSWORD")?,
            goonhub,
            marker_user_id,
            scene_limit,
            dry_run: vars.flag("DRY_RUN"),
            skip_file_check: vars.flag("SKIP_FILE_CHECK"),
            mappings_file: PathBuf::from(DEFAULT_MAPPINGS_FILE),
            id_map_file: PathBuf::from(DEFAULT_ID_MAP_FILE),
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        self.dry_run |= overrides.dry_run;
        self.skip_file_check |= overrides.skip_file_check;
        if overrides.scene_limit.is_some() {
            self.scene_limit = overrides.scene_limit;
        }
        if let Some(path) = overrides.mappings {
            self.mappings_file = path;
        }
        if let Some(path) = overrides.id_map {
            self.id_map_file = path;
        }
    }
}

#[derive(Debug, Deserialize)]
struct MappingsFile {
    #[serde(default)]
    path_mappings: Vec<PathRule>,
}

/// Load the ordered path-mapping rules. A missing, malformed, or empty file
/// is a setup error.
pub fn load_mappings(path: &Path) -> Result<Vec<PathRule>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => bail!(
            "mappings file not found: {} (create it with a path_mappings array)",
            path.display()
        ),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let parsed: MappingsFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse mappings file {}", path.display()))?;
    if parsed.path_mappings.is_empty() {
        bail!("no path_mappings defined in {}", path.display());
    }
    Ok(parsed.path_mappings)
}
