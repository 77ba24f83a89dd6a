use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Field name to the list of messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error")]
    Invalid(FieldErrors),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Error::Invalid(errors)
    }
}

fn validation_field_errors(err: &validator::ValidationErrors) -> FieldErrors {
    err.field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is invalid ({}).", field.replace('_', " "), e.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "success": false, "message": "Validation error", "errors": errors }),
            ),
            Error::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "success": false,
                    "message": "Validation error",
                    "errors": validation_field_errors(&err),
                }),
            ),
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            Error::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": msg }),
            ),
            Error::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": msg }),
            ),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "message": "An unexpected error occurred",
                        "error": other.to_string(),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<tokio_cron_scheduler::JobSchedulerError> for Error {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        Error::Scheduler(format!("{:?}", err))
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::invalid("query", rejection.body_text())
    }
}

/// Field name from an axum JSON data error, e.g. "missing field `title_en`"
/// or "posted_date: input contains invalid characters at line 1 column 40".
fn json_field_error(detail: &str) -> Option<(String, String)> {
    let detail = detail.split(" at line ").next().unwrap_or(detail);
    if let Some(rest) = detail.strip_prefix("missing field `") {
        let field = rest.split('`').next()?;
        let message = format!("The {} field is required.", field.replace('_', " "));
        return Some((field.to_string(), message));
    }

    let (path, reason) = detail.split_once(": ")?;
    let field = path.split(['.', '[']).next()?;
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let message = format!("The {} field is invalid: {}.", field.replace('_', " "), reason);
    Some((field.to_string(), message))
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        if let JsonRejection::JsonDataError(err) = &rejection {
            let text = err.body_text();
            let detail = text.split_once(": ").map_or(text.as_str(), |(_, d)| d);
            if let Some((field, message)) = json_field_error(detail) {
                return Error::invalid(&field, message);
            }
        }
        Error::invalid("body", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value as JsonValue;

    async fn render(err: Error) -> (StatusCode, JsonValue) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_maps_to_422_with_field_errors() {
        let (status, body) = render(Error::invalid("closed_date", "too early")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["closed_date"][0], "too early");
    }

    #[tokio::test]
    async fn not_found_and_bad_request_keep_message() {
        let (status, body) = render(Error::NotFound("Vacancy not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Vacancy not found");

        let (status, _) = render(Error::BadRequest("nope".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unexpected_errors_carry_raw_text() {
        let (status, body) = render(Error::Internal("pool timed out".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal error: pool timed out");
    }

    #[test]
    fn json_data_errors_are_keyed_by_field() {
        let (field, message) =
            json_field_error("missing field `title_en` at line 1 column 79").unwrap();
        assert_eq!(field, "title_en");
        assert_eq!(message, "The title en field is required.");

        let (field, message) =
            json_field_error("posted_date: input contains invalid characters at line 1 column 40")
                .unwrap();
        assert_eq!(field, "posted_date");
        assert!(message.contains("input contains invalid characters"));

        let (field, _) =
            json_field_error("department_id: invalid type: string \"abc\", expected i64").unwrap();
        assert_eq!(field, "department_id");

        assert!(json_field_error("invalid type: sequence, expected struct VacancyPayload").is_none());
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            Error::from(sqlx::Error::RowNotFound),
            Error::NotFound(_)
        ));
    }
}
