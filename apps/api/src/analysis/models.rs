use std::num::NonZeroUsize;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, MAX_FRAME_COUNT, MAX_REPEAT_COUNT};
use crate::errors::AppError;
use crate::rubrics::{FramePolicy, Rubric};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Query parameters accepted by `POST /api/v1/analyze/:rubric_id`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub frames: Option<usize>,
    pub repeat: Option<usize>,
    pub frame_policy: Option<FramePolicy>,
    #[serde(default)]
    pub download: bool,
}

/// Fully resolved knobs for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub frames: NonZeroUsize,
    pub repeat: NonZeroUsize,
    pub frame_policy: FramePolicy,
}

impl AnalyzeParams {
    /// Applies configured defaults and the rubric's frame policy, then bounds-checks.
    pub fn resolve(&self, rubric: &Rubric, config: &Config) -> Result<AnalysisOptions, AppError> {
        let frames = self.frames.unwrap_or(config.default_frame_count);
        let repeat = self.repeat.unwrap_or(config.default_repeat_count);

        let frames = NonZeroUsize::new(frames)
            .filter(|n| n.get() <= MAX_FRAME_COUNT)
            .ok_or_else(|| {
                AppError::Validation(format!("frames must be between 1 and {MAX_FRAME_COUNT}"))
            })?;
        let repeat = NonZeroUsize::new(repeat)
            .filter(|n| n.get() <= MAX_REPEAT_COUNT)
            .ok_or_else(|| {
                AppError::Validation(format!("repeat must be between 1 and {MAX_REPEAT_COUNT}"))
            })?;

        Ok(AnalysisOptions {
            frames,
            repeat,
            frame_policy: self.frame_policy.unwrap_or(rubric.frame_policy),
        })
    }
}

/// The uploaded file, as read from the multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Result types (request-scoped, dropped after the response)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MediaSummary {
    pub kind: &'static str,
    pub mime_type: &'static str,
    pub filename: Option<String>,
    pub size_bytes: usize,
}

/// Model output for one analysed image (the upload itself, or one sampled frame).
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysis {
    /// Source frame index; `None` when the upload was a still image.
    pub frame_index: Option<u64>,
    pub responses: Vec<String>,
    pub merged: String,
    /// Responses that parsed as JSON (JSON rubrics only).
    pub structured: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub request_id: Uuid,
    pub rubric_id: &'static str,
    pub rubric_title: &'static str,
    pub model: String,
    pub media: MediaSummary,
    /// Every frame index the sampler produced, including ones not analysed.
    pub sampled_frame_indices: Vec<u64>,
    pub repeat: usize,
    pub analyses: Vec<FrameAnalysis>,
    pub created_at: DateTime<Utc>,
}
