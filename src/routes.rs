use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::assembler::DocumentAssembler;
use crate::errors::ExportError;
use crate::state::AppState;
use crate::store::resolve_records;
use crate::writer::PdfPageWriter;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/orders/export", post(export_orders))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Render the requested orders into one PDF.
///
/// The document is sealed before the response starts, so a failure is always
/// a JSON error and never a truncated PDF.
async fn export_orders(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ExportError> {
    let records = resolve_records(state.store.as_ref(), &request.ids).await?;

    let writer = PdfPageWriter::new("Orders", state.geometry);
    let (pdf, summary) = DocumentAssembler::new(
        state.fetcher.as_ref(),
        writer,
        state.geometry,
        state.export_options(),
    )
    .assemble(&records)
    .await?;

    info!(
        records = summary.records,
        pages = summary.pages,
        images_failed = summary.images_failed,
        bytes = pdf.len(),
        "export ready"
    );

    let disposition = format!("attachment; filename=\"{}\"", state.config.export_filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(chunked(Bytes::from(pdf))),
    )
        .into_response())
}

/// Split a sealed document into fixed-size chunks for a streamed body.
fn chunked(pdf: Bytes) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let starts = (0..pdf.len()).step_by(CHUNK_SIZE);
    futures::stream::iter(starts.map(move |start| {
        let end = (start + CHUNK_SIZE).min(pdf.len());
        Ok::<_, std::io::Error>(pdf.slice(start..end))
    }))
}
