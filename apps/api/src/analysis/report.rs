//! Markdown rendering of an `AnalysisResult`, served as a download.

use std::fmt::Write as _;

use crate::analysis::models::AnalysisResult;

/// Attachment filename for a result: `adlens-<rubric>-<request_id>.md`.
pub fn attachment_filename(result: &AnalysisResult) -> String {
    format!("adlens-{}-{}.md", result.rubric_id, result.request_id)
}

pub fn render_markdown(result: &AnalysisResult) -> String {
    let mut out = String::with_capacity(4096);

    let _ = writeln!(out, "# {}\n", result.rubric_title);
    let _ = writeln!(out, "- Request: `{}`", result.request_id);
    let _ = writeln!(
        out,
        "- Media: {} ({}), {}, {} bytes",
        result.media.kind,
        result.media.mime_type,
        result.media.filename.as_deref().unwrap_or("unnamed upload"),
        result.media.size_bytes
    );
    let _ = writeln!(
        out,
        "- Model: {}, {} run(s) per image",
        result.model, result.repeat
    );
    if !result.sampled_frame_indices.is_empty() {
        let indices: Vec<String> = result
            .sampled_frame_indices
            .iter()
            .map(u64::to_string)
            .collect();
        let _ = writeln!(out, "- Sampled frames: {}", indices.join(", "));
    }
    let _ = writeln!(out, "- Generated: {}", result.created_at.to_rfc3339());

    for analysis in &result.analyses {
        match analysis.frame_index {
            Some(index) => {
                let _ = writeln!(out, "\n## Frame {index}");
            }
            None => {
                let _ = writeln!(out, "\n## Analysis");
            }
        }
        for (run, response) in analysis.responses.iter().enumerate() {
            let _ = writeln!(out, "\n### Run {}\n\n{}", run + 1, response.trim());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::analysis::models::{FrameAnalysis, MediaSummary};

    fn result(frame_indices: Vec<Option<u64>>, sampled: Vec<u64>) -> AnalysisResult {
        AnalysisResult {
            request_id: Uuid::nil(),
            rubric_id: "headline",
            rubric_title: "Headline quality",
            model: "gemini-test".to_string(),
            media: MediaSummary {
                kind: "video",
                mime_type: "video/mp4",
                filename: Some("spot.mp4".to_string()),
                size_bytes: 2048,
            },
            sampled_frame_indices: sampled,
            repeat: 2,
            analyses: frame_indices
                .into_iter()
                .map(|frame_index| FrameAnalysis {
                    frame_index,
                    responses: vec!["Clarity: 8/10\n".to_string(), "Clarity: 7/10".to_string()],
                    merged: "Clarity: 8/10\n\n\nClarity: 7/10".to_string(),
                    structured: Vec::new(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_attachment_filename() {
        let r = result(vec![None], Vec::new());
        assert_eq!(
            attachment_filename(&r),
            "adlens-headline-00000000-0000-0000-0000-000000000000.md"
        );
    }

    #[test]
    fn test_markdown_for_video_lists_frames_and_runs() {
        let md = render_markdown(&result(vec![Some(0), Some(20)], vec![0, 20, 40]));
        assert!(md.starts_with("# Headline quality\n"));
        assert!(md.contains("- Sampled frames: 0, 20, 40"));
        assert!(md.contains("## Frame 0"));
        assert!(md.contains("## Frame 20"));
        assert_eq!(md.matches("### Run 1").count(), 2);
        assert!(md.contains("### Run 2\n\nClarity: 7/10"));
    }

    #[test]
    fn test_markdown_for_image_has_single_section() {
        let md = render_markdown(&result(vec![None], Vec::new()));
        assert!(!md.contains("Sampled frames"));
        assert!(md.contains("## Analysis"));
        assert!(!md.contains("## Frame"));
    }
}
