use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of a destination list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Whether to request page `requested + 1`. Decided from the page this
    /// client asked for, not the one echoed back. A short or empty page is the
    /// last; endpoints that return everything at once carry no pagination block.
    pub fn has_more(&self, requested: u32, limit: u32) -> bool {
        let Some(p) = &self.pagination else {
            return false;
        };
        if self.data.is_empty() || self.data.len() < limit as usize {
            return false;
        }
        requested < p.total_pages
    }
}
