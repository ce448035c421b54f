use serde::Deserialize;
use thiserror::Error;

/// One prefix rewrite rule; order within the configured list is significant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathRule {
    #[serde(rename = "stash_prefix")]
    pub source_prefix: String,
    #[serde(rename = "goonhub_prefix")]
    pub destination_prefix: String,
    #[serde(rename = "storage_path_id", default)]
    pub storage_location_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    pub destination_path: String,
    pub storage_location_id: u64,
}

impl MappedPath {
    /// Storage location to send along with an import; zero means "let the destination pick".
    pub fn storage_location(&self) -> Option<u64> {
        (self.storage_location_id > 0).then_some(self.storage_location_id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no path mapping found for: {0}")]
pub struct NoPathMapping(pub String);

/// Rewrites source file paths to destination storage paths, first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct PathMapper {
    rules: Vec<PathRule>,
}

impl PathMapper {
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self { rules }
    }

    pub fn translate(&self, source_path: &str) -> Result<MappedPath, NoPathMapping> {
        let rule = self
            .rules
            .iter()
            .find(|r| source_path.starts_with(r.source_prefix.as_str()))
            .ok_or_else(|| NoPathMapping(source_path.to_string()))?;

        let remainder = &source_path[rule.source_prefix.len()..];
        let destination_path = format!(
            "{}/{}",
            rule.destination_prefix.trim_end_matches('/'),
            remainder.trim_start_matches('/')
        );
        Ok(MappedPath {
            destination_path,
            storage_location_id: rule.storage_location_id,
        })
    }
}
