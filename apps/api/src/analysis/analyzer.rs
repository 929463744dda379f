//! Analysis pipeline: one upload, one rubric, one request-scoped result.
//!
//! Pipeline: validate upload → sniff kind → (video) sample frames on the
//! blocking pool → pick frames per policy → repeated model calls → result.
//! Images are forwarded as uploaded; only video goes through the sampler.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::models::{
    AnalysisOptions, AnalysisResult, FrameAnalysis, MediaSummary, Upload,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{video_frame_note, ANALYST_SYSTEM};
use crate::llm_client::{generate_repeated, strip_json_fences, ModelClient, ModelImage};
use crate::media::sampler::FrameSampler;
use crate::media::{detect_media, Frame, MediaKind};
use crate::rubrics::{FramePolicy, OutputFormat, Rubric};

/// One image bound for the model, with its position context.
struct ModelInput {
    frame_index: Option<u64>,
    note: Option<String>,
    image: ModelImage,
}

pub async fn analyze_upload(
    model: &dyn ModelClient,
    sampler: Arc<FrameSampler>,
    rubric: &'static Rubric,
    upload: Upload,
    options: AnalysisOptions,
) -> Result<AnalysisResult, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let detected = detect_media(&upload.bytes).ok_or_else(|| {
        AppError::UnsupportedMedia("upload is neither an image nor a video".to_string())
    })?;

    info!(
        "Analysing {} ({}, {} bytes) with rubric '{}'",
        detected.kind.as_str(),
        detected.mime_type,
        upload.bytes.len(),
        rubric.id
    );

    let media = MediaSummary {
        kind: detected.kind.as_str(),
        mime_type: detected.mime_type,
        filename: upload.filename.clone(),
        size_bytes: upload.bytes.len(),
    };

    let (sampled_frame_indices, inputs) = match detected.kind {
        MediaKind::Image => (
            Vec::new(),
            vec![ModelInput {
                frame_index: None,
                note: None,
                image: ModelImage::new(detected.mime_type, upload.bytes),
            }],
        ),
        MediaKind::Video => sample_video(sampler, upload, options).await?,
    };

    let base_prompt = rubric.render_prompt();
    let mut analyses = Vec::with_capacity(inputs.len());

    for input in &inputs {
        let prompt = match &input.note {
            Some(note) => format!("{note}\n\n{base_prompt}"),
            None => base_prompt.clone(),
        };

        let out = generate_repeated(
            model,
            ANALYST_SYSTEM,
            &prompt,
            Some(&input.image),
            options.repeat,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Rubric '{}' failed: {e}", rubric.id)))?;

        let structured = match rubric.output {
            OutputFormat::Json => parse_structured(&out.responses),
            OutputFormat::Text => Vec::new(),
        };

        analyses.push(FrameAnalysis {
            frame_index: input.frame_index,
            responses: out.responses,
            merged: out.merged,
            structured,
        });
    }

    Ok(AnalysisResult {
        request_id: Uuid::new_v4(),
        rubric_id: rubric.id,
        rubric_title: rubric.title,
        model: model.model_name().to_string(),
        media,
        sampled_frame_indices,
        repeat: options.repeat.get(),
        analyses,
        created_at: Utc::now(),
    })
}

/// Samples on the blocking pool and PNG-encodes the frames the policy selects.
/// Returns every sampled index alongside the model inputs.
async fn sample_video(
    sampler: Arc<FrameSampler>,
    upload: Upload,
    options: AnalysisOptions,
) -> Result<(Vec<u64>, Vec<ModelInput>), AppError> {
    tokio::task::spawn_blocking(move || -> Result<(Vec<u64>, Vec<ModelInput>), AppError> {
        let set = sampler.sample_bytes(&upload.bytes, options.frames)?;
        let sampled = set.indices();
        let total = set.len();

        let selected: Vec<Frame> = match options.frame_policy {
            FramePolicy::First => vec![set.first().clone()],
            FramePolicy::All => set.into_frames(),
        };

        let inputs = selected
            .iter()
            .enumerate()
            .map(|(position, frame)| -> Result<ModelInput, AppError> {
                debug!(
                    "encoding frame {} ({}x{})",
                    frame.index,
                    frame.width(),
                    frame.height()
                );
                let png = frame.to_png().map_err(|e| {
                    AppError::Internal(anyhow::Error::new(e).context("encoding sampled frame"))
                })?;
                Ok(ModelInput {
                    frame_index: Some(frame.index),
                    note: Some(video_frame_note(position + 1, total, frame.index)),
                    image: ModelImage::new("image/png", png),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok((sampled, inputs))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("frame sampling task failed: {e}")))?
}

/// Keeps the responses that parse as JSON once code fences are stripped.
fn parse_structured(responses: &[String]) -> Vec<serde_json::Value> {
    responses
        .iter()
        .filter_map(|r| serde_json::from_str(strip_json_fences(r)).ok())
        .collect()
}
