// Shared prompt constants and prompt-building utilities.
// Rubric-specific templates live in rubrics/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt shared by every rubric call.
pub const ANALYST_SYSTEM: &str = "You are a senior marketing creative strategist. \
    You critique advertising creative (static ads, social posts, video ads) \
    against a specific rubric. Be concrete: cite what is visible in the asset. \
    Never invent copy, logos, or people that are not visible.";

/// Appended to rubrics whose output is parsed as JSON.
pub const JSON_OUTPUT_INSTRUCTION: &str = "\
    OUTPUT FORMAT: Respond with valid JSON only, matching the schema above. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Appended to rubrics whose output is free text.
pub const TEXT_OUTPUT_INSTRUCTION: &str = "\
    OUTPUT FORMAT: Respond in concise Markdown. Use the headings named above, \
    give each scored item a score out of 10 followed by a one-sentence rationale, \
    and finish with the three highest-impact improvements.";

/// Prefix for prompts sent with a frame sampled from a video rather than a still.
/// Replace `{position}`, `{count}` and `{index}` before sending.
pub const VIDEO_FRAME_NOTE: &str = "\
    NOTE: The attached image is frame {position} of {count} sampled evenly from a \
    video advertisement (source frame index {index}). Judge it as a moment of that \
    video, not as a standalone static ad.";

/// Fills in `VIDEO_FRAME_NOTE` for a given frame.
pub fn video_frame_note(position: usize, count: usize, index: u64) -> String {
    VIDEO_FRAME_NOTE
        .replace("{position}", &position.to_string())
        .replace("{count}", &count.to_string())
        .replace("{index}", &index.to_string())
}
