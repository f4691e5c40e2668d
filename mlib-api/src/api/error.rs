//! HTTP error responses
//!
//! Every failure is answered with a JSON object carrying at least an `error`
//! key. Validation failures also enumerate the offending fields.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mlib_common::FieldError;
use serde_json::{json, Value};

use super::payload::REQUIRED_FIELDS;

#[derive(Debug)]
pub enum ApiError {
    /// Required keys absent or falsy (400)
    MissingFields {
        missing: Vec<&'static str>,
        received: Value,
    },
    /// Field constraints rejected by the persistence layer (400)
    Validation(Vec<FieldError>),
    /// Path id matched no row (404)
    NotFound(String),
    /// Unexpected store failure (500)
    Store {
        context: &'static str,
        details: String,
    },
}

impl ApiError {
    /// Map a persistence error, keeping validation failures as 400s
    pub fn store(context: &'static str, err: mlib_common::Error) -> Self {
        match err {
            mlib_common::Error::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::Store {
                context,
                details: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingFields { missing, received } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Missing required fields",
                    "required": REQUIRED_FIELDS,
                    "missing": missing,
                    "received": received,
                }),
            ),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Validation error",
                    "details": errors,
                }),
            ),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Track not found",
                    "message": format!("No track found with ID {}", id),
                }),
            ),
            ApiError::Store { context, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": context,
                    "details": details,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
