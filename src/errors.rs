use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::writer::SinkError;

/// Failures that abort an export. All of them surface before the first
/// byte of the document is sent. Image fetch failures never end up here.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No records requested")]
    NoRecords,

    #[error("Records not found: {}", .0.join(", "))]
    RecordsNotFound(Vec<String>),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Document output error: {0}")]
    Sink(#[from] SinkError),
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ExportError::NoRecords => (
                StatusCode::NOT_FOUND,
                "NO_RECORDS",
                "No records were requested for export".to_string(),
            ),
            ExportError::RecordsNotFound(_) => {
                (StatusCode::NOT_FOUND, "RECORDS_NOT_FOUND", self.to_string())
            }
            ExportError::Store(e) => {
                tracing::error!("Record store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Records could not be loaded".to_string(),
                )
            }
            ExportError::Sink(e) => {
                tracing::error!("Document output error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The document could not be generated".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_records_are_404() {
        let response = ExportError::RecordsNotFound(vec!["7".into(), "9".into()]).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_sink_failure_is_500() {
        let response = ExportError::Sink(SinkError::EmptyDocument).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_lists_missing_ids() {
        let err = ExportError::RecordsNotFound(vec!["7".into(), "9".into()]);
        assert_eq!(err.to_string(), "Records not found: 7, 9");
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_code() {
        let response = ExportError::Store(StoreError::Unavailable("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "STORE_ERROR");
    }
}
