use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use validator::ValidationErrors;

use crate::ApiResponse;

/// 返回资源类型
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 系统定义错误
///
/// Every failure a handler can report falls into one of these kinds, so the
/// caller can always tell a missing record from a bad upstream response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Unknown CEP on get/update/toggle.
    #[error("{0}")]
    NotFound(String),

    /// Missing or empty required field on write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Source provider unreachable, timed out, or answered with a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Source provider returned an entry that cannot become a record.
    #[error("mapping error: {0}")]
    Mapping(String),

    /// Backend failure on any store operation.
    #[error("store error: {0}")]
    Store(String),

    /// Bad or missing configuration at startup.
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_)
            | ApiError::Mapping(_)
            | ApiError::Store(_)
            | ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn format_errors(errors: &ValidationErrors) -> Vec<HashMap<String, String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, err)| {
            let message = err
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect::<Vec<String>>()
                .join(",");

            let mut map_data = HashMap::new();
            map_data.insert(field.to_owned(), message);
            map_data
        })
        .collect::<Vec<HashMap<String, String>>>()
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        let mut fields = format_errors(&value)
            .into_iter()
            .flat_map(|item| item.into_iter())
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<String>>();
        // field_errors() iterates a HashMap
        fields.sort();

        ApiError::Validation(fields.join("; "))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(value: sqlx::Error) -> Self {
        ApiError::Store(value.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return ApiError::Upstream(format!("request timed out: {}", value));
        }
        ApiError::Upstream(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }

        ApiResponse::fail_msg_code(status, self.to_string()).json()
    }
}
