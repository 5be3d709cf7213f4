//! Data models shared across database access and API handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Wrapper for paginated API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, per_page: i64) -> Self {
        Self {
            data,
            page,
            per_page,
        }
    }
}

pub mod attendance;
pub mod regularization_request;
pub mod user;
