//! REST API module.
//!
//! Routes and handlers for the dashboard frontend. Every response uses the
//! `{success, data}` envelope; errors use the envelope from [`crate::errors`].

mod assistant;
mod cache;
mod dashboard;
mod eips;
mod projects;

pub use assistant::*;
pub use cache::*;
pub use dashboard::*;
pub use eips::*;
pub use projects::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Parse an optional query label, rejecting unknown values.
fn parse_label<T>(
    field: &str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(label) => parse(label)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown {field}: {label}"))),
    }
}

/// Parse a proposal number path segment.
fn parse_number(raw: &str) -> Result<u32, AppError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("eip-")
        .or_else(|| trimmed.strip_prefix("EIP-"))
        .unwrap_or(trimmed);
    digits
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid EIP number: {raw}")))
}
