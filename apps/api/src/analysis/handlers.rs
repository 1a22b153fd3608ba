//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::analysis::pipeline::{run_analysis, run_refinement};
use crate::errors::AppError;
use crate::models::{AnalyzeResponse, Document, RefineRequest, RefineResponse};
use crate::state::AppState;

/// POST /analyze
///
/// Multipart form with a `file` part (PDF, DOCX, TXT or MD) and a `job_description`
/// text part. Returns the extracted text, the analysis and the first rewrite.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut document: Option<Document> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                document = Some(Document::new(file_name, bytes));
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("file part is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description part is required".to_string()))?;

    let response = run_analysis(state.analyzer.as_ref(), &document, &job_description).await?;
    Ok(Json(response))
}

/// POST /refine
///
/// Rewrites the original résumé again, applying the user's feedback.
pub async fn handle_refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    let response = run_refinement(state.analyzer.as_ref(), &request).await?;
    Ok(Json(response))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {err}"))
}
