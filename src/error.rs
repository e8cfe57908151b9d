use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "This field is required.")
    }
}

/// Error taxonomy surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("permission denied")]
    Forbidden,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid page")]
    InvalidPage,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => detail(StatusCode::UNAUTHORIZED, &msg),
            ApiError::Forbidden => detail(
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.",
            ),
            ApiError::Validation(fields) => {
                let mut errors = serde_json::Map::new();
                for f in fields {
                    if let Some(msgs) = errors
                        .entry(f.field.to_string())
                        .or_insert_with(|| json!([]))
                        .as_array_mut()
                    {
                        msgs.push(json!(f.message));
                    }
                }
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "errors": errors })),
                )
                    .into_response()
            }
            ApiError::NotFound(_) => detail(StatusCode::NOT_FOUND, "Not found."),
            ApiError::InvalidPage => detail(StatusCode::NOT_FOUND, "Invalid page."),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_body_groups_messages_by_field() {
        let err = ApiError::Validation(vec![
            FieldError::required("title"),
            FieldError::required("ingredients"),
            FieldError::new("title", "Too long."),
        ]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body,
            json!({
                "errors": {
                    "title": ["This field is required.", "Too long."],
                    "ingredients": ["This field is required."],
                }
            })
        );
    }

    #[tokio::test]
    async fn forbidden_body_is_a_detail_message() {
        let response = ApiError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body,
            json!({ "detail": "You do not have permission to perform this action." })
        );
    }

    #[test]
    fn field_error_required_message() {
        let e = FieldError::required("instructions");
        assert_eq!(e.field, "instructions");
        assert_eq!(e.message, "This field is required.");
    }
}
