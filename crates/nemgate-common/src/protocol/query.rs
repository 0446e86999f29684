use serde::{Deserialize, Serialize};

/// Page size a node uses when the request carries none.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Smallest page size nodes accept.
pub const MIN_PAGE_SIZE: u32 = 5;
/// Largest page size nodes accept.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters of a collection query.
///
/// `id` is an exclusive continuation cursor: only items past it are
/// returned. Absent means "most recent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// The page size the node will actually use.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Renders `id=..&pageSize=..`, leaving out absent parameters.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(id) = self.id {
            parts.push(format!("id={}", id));
        }
        if let Some(page_size) = self.page_size {
            parts.push(format!("pageSize={}", page_size));
        }
        parts.join("&")
    }
}

/// Clamps a requested page size into the range nodes accept.
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}
