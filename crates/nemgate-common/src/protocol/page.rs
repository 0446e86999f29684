use serde::{Deserialize, Serialize};

/// Envelope of every collection response: `{"data": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
}

impl<T> PageResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data
    }
}
