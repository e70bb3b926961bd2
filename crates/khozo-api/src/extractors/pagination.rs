//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use khozo_core::types::PageRequest;

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default: 25, max: 100).
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    25
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Converts to a `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_clamped() {
        let request = PaginationParams {
            page: 0,
            per_page: 1_000,
        }
        .into_page_request();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 100);

        let request = PaginationParams::default().into_page_request();
        assert_eq!(request.page_size, 25);
    }
}
