//! Axum route handlers for the Analysis API.

use axum::{
    extract::{
        multipart::MultipartError, rejection::QueryRejection, Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::analysis::analyzer::analyze_upload;
use crate::analysis::models::{AnalyzeParams, Upload};
use crate::analysis::report::{attachment_filename, render_markdown};
use crate::errors::AppError;
use crate::rubrics::{self, RubricSummary};
use crate::state::AppState;

/// Multipart field carrying the uploaded asset.
const FILE_FIELD: &str = "file";

/// GET /api/v1/rubrics
pub async fn handle_list_rubrics() -> Json<Vec<RubricSummary>> {
    Json(rubrics::all().iter().map(RubricSummary::from).collect())
}

/// POST /api/v1/analyze/:rubric_id
///
/// Multipart upload with a `file` field (image or video). Video is sampled
/// into frames first. Returns the `AnalysisResult` as JSON, or a Markdown
/// report attachment when `download=true`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(rubric_id): Path<String>,
    params: Result<Query<AnalyzeParams>, QueryRejection>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Query(params) = params
        .map_err(|e| AppError::Validation(format!("invalid query: {}", e.body_text())))?;
    let rubric = rubrics::find(&rubric_id)
        .ok_or_else(|| AppError::NotFound(format!("Rubric '{rubric_id}' not found")))?;
    let options = params.resolve(rubric, &state.config)?;

    let upload = read_upload(multipart).await?;

    let result = analyze_upload(
        state.model.as_ref(),
        state.sampler.clone(),
        rubric,
        upload,
        options,
    )
    .await?;

    if params.download {
        let disposition = format!("attachment; filename=\"{}\"", attachment_filename(&result));
        return Ok((
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            render_markdown(&result),
        )
            .into_response());
    }

    Ok(Json(result).into_response())
}

/// Pulls the `file` field out of the multipart body; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { filename, bytes });
    }
    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("malformed multipart body: {}", err.body_text()))
    }
}
