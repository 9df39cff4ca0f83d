use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

pub mod analytics;
pub mod auth;
pub mod clients;
pub mod exchange_rates;
pub mod items;

/// The pagination envelope attached to every listing response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_limit() -> i64 {
    20
}

/// # GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(0, 1, 20).total_pages, 0);
        assert_eq!(Pagination::new(20, 1, 20).total_pages, 1);
        assert_eq!(Pagination::new(21, 1, 20).total_pages, 2);
    }
}
