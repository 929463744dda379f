//! Rubric registry, the static catalogue of marketing critiques Adlens offers.
//!
//! Each rubric pairs a prompt template with how its output is treated and how
//! many sampled frames of a video it looks at. The registry is plain data; no
//! rubric has behaviour of its own.

use serde::{Deserialize, Serialize};

pub mod prompts;

use prompts::*;

/// How a rubric's model output is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw text, passed through.
    Text,
    /// JSON; responses that parse are also returned structured.
    Json,
}

/// Which sampled frames of a video reach the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramePolicy {
    /// Only the first sampled frame, analysed like a still.
    First,
    /// Every sampled frame, one call each.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Copy,
    Emotion,
    Persuasion,
    Audience,
    Brand,
    Design,
    Video,
}

#[derive(Debug)]
pub struct Rubric {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub prompt: &'static str,
    pub output: OutputFormat,
    pub frame_policy: FramePolicy,
}

impl Rubric {
    /// Full user prompt: template followed by the output-format instruction.
    pub fn render_prompt(&self) -> String {
        let format = match self.output {
            OutputFormat::Text => crate::llm_client::prompts::TEXT_OUTPUT_INSTRUCTION,
            OutputFormat::Json => crate::llm_client::prompts::JSON_OUTPUT_INSTRUCTION,
        };
        format!("{}\n\n{}", self.prompt.trim_end(), format)
    }
}

/// Public listing entry for a rubric.
#[derive(Debug, Clone, Serialize)]
pub struct RubricSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub output: OutputFormat,
    pub frame_policy: FramePolicy,
}

impl From<&Rubric> for RubricSummary {
    fn from(r: &Rubric) -> Self {
        Self {
            id: r.id,
            title: r.title,
            category: r.category,
            output: r.output,
            frame_policy: r.frame_policy,
        }
    }
}

static RUBRICS: &[Rubric] = &[
    Rubric {
        id: "headline",
        title: "Headline quality",
        category: Category::Copy,
        prompt: HEADLINE_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "copy-readability",
        title: "Copy readability",
        category: Category::Copy,
        prompt: READABILITY_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "call-to-action",
        title: "Call-to-action strength",
        category: Category::Copy,
        prompt: CTA_PROMPT,
        output: OutputFormat::Json,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "emotional-resonance",
        title: "Emotional resonance",
        category: Category::Emotion,
        prompt: EMOTION_PROMPT,
        output: OutputFormat::Json,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "persuasion-principles",
        title: "Persuasion principles",
        category: Category::Persuasion,
        prompt: PERSUASION_PROMPT,
        output: OutputFormat::Json,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "target-personas",
        title: "Targeting personas",
        category: Category::Audience,
        prompt: PERSONAS_PROMPT,
        output: OutputFormat::Json,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "brand-consistency",
        title: "Brand consistency",
        category: Category::Brand,
        prompt: BRAND_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "visual-hierarchy",
        title: "Visual hierarchy",
        category: Category::Design,
        prompt: HIERARCHY_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "color-psychology",
        title: "Colour psychology",
        category: Category::Design,
        prompt: COLOR_PROMPT,
        output: OutputFormat::Json,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "accessibility",
        title: "Accessibility",
        category: Category::Design,
        prompt: ACCESSIBILITY_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "video-hook",
        title: "Video hook (stop power)",
        category: Category::Video,
        prompt: HOOK_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::First,
    },
    Rubric {
        id: "storyboard-flow",
        title: "Storyboard flow",
        category: Category::Video,
        prompt: STORYBOARD_PROMPT,
        output: OutputFormat::Text,
        frame_policy: FramePolicy::All,
    },
];

/// Every registered rubric, in display order.
pub fn all() -> &'static [Rubric] {
    RUBRICS
}

pub fn find(id: &str) -> Option<&'static Rubric> {
    RUBRICS.iter().find(|r| r.id == id)
}
