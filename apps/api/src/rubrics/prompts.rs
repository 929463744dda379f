// Rubric prompt templates.
// Each template is sent with the attached image or sampled video frame.
// Output-format instructions are appended by `Rubric::render_prompt`.

pub const HEADLINE_PROMPT: &str = r#"Evaluate the HEADLINE of the attached advertisement.

Score each item out of 10:
## Clarity
Is the core message understood in under three seconds?
## Specificity
Does it name a concrete benefit, number, or outcome rather than a vague promise?
## Curiosity
Does it open a loop the reader wants closed without resorting to clickbait?
## Relevance
Does it speak to a problem the likely audience actually has?
## Length and scannability
Is it short enough to read at a glance on a mobile feed?

If no headline is visible, say so and score every item 0."#;

pub const READABILITY_PROMPT: &str = r#"Evaluate the READABILITY of all copy visible in the attached advertisement.

Score each item out of 10:
## Legibility
Font size, weight, and contrast against the background.
## Plain language
Short words and sentences; no jargon the audience would not use.
## Density
Amount of text relative to the canvas; would it survive a two-second glance?
## Structure
Is there a clear reading order (headline, support, CTA)?"#;

pub const CTA_PROMPT: &str = r#"Evaluate the CALL TO ACTION of the attached advertisement.

Return a JSON object with this EXACT schema:
{
  "cta_text": "Shop the sale",
  "cta_present": true,
  "scores": {
    "visibility": 8,
    "action_verb_strength": 7,
    "urgency": 5,
    "friction": 6
  },
  "overall": 7,
  "rationale": "One or two sentences grounded in what is visible.",
  "rewrite_suggestions": ["Claim 20% off today", "Get yours before Friday"]
}

Rules:
- Scores are integers 0-10.
- "friction" is HIGH when the next step feels easy.
- If no CTA is visible, set "cta_present" to false, "cta_text" to null and every score to 0."#;

pub const EMOTION_PROMPT: &str = r#"Evaluate the EMOTIONAL RESONANCE of the attached advertisement.

Return a JSON object with this EXACT schema:
{
  "primary_emotion": "joy",
  "secondary_emotions": ["nostalgia"],
  "intensity": 6,
  "authenticity": 7,
  "emotion_to_brand_link": 5,
  "evidence": ["Smiling family at a kitchen table", "Warm colour grading"],
  "risks": ["Could read as generic stock imagery"]
}

Rules:
- Emotions come from: joy, trust, fear, surprise, sadness, anticipation, anger, disgust, nostalgia, pride, belonging, relief.
- Scores are integers 0-10.
- "evidence" must cite visible elements only."#;

pub const PERSUASION_PROMPT: &str = r#"Evaluate the attached advertisement against Cialdini's principles of persuasion.

Return a JSON object with this EXACT schema:
{
  "principles": [
    {"principle": "reciprocity", "present": false, "strength": 0, "evidence": null},
    {"principle": "commitment", "present": false, "strength": 0, "evidence": null},
    {"principle": "social_proof", "present": true, "strength": 7, "evidence": "\"Join 2M runners\" badge"},
    {"principle": "authority", "present": false, "strength": 0, "evidence": null},
    {"principle": "liking", "present": false, "strength": 0, "evidence": null},
    {"principle": "scarcity", "present": false, "strength": 0, "evidence": null},
    {"principle": "unity", "present": false, "strength": 0, "evidence": null}
  ],
  "dominant_principle": "social_proof",
  "overall": 6,
  "missed_opportunity": "One principle that would fit this creative and how to add it."
}

Rules:
- Always return all seven principles in this order.
- Strength is an integer 0-10; 0 whenever "present" is false."#;

pub const PERSONAS_PROMPT: &str = r#"Identify the TARGET PERSONAS the attached advertisement appeals to.

Return a JSON object with this EXACT schema:
{
  "personas": [
    {
      "name": "Time-poor urban parent",
      "age_range": "30-45",
      "motivations": ["convenience", "family health"],
      "fit": 8,
      "signals": ["Lunchbox imagery", "\"Ready in 5 minutes\" claim"]
    }
  ],
  "excluded_audiences": ["Audiences the creative would likely alienate"],
  "targeting_recommendation": "Which persona to prioritise in paid targeting and why."
}

Rules:
- Return between one and four personas, best fit first.
- "fit" is an integer 0-10."#;

pub const BRAND_PROMPT: &str = r#"Evaluate BRAND CONSISTENCY in the attached advertisement.

Score each item out of 10:
## Brand visibility
Is the brand identifiable without reading small print?
## Logo placement
Size, position, and clear space.
## Visual identity
Consistent use of a recognisable palette, typography, and imagery style.
## Voice
Does the copy sound like one coherent brand personality?"#;

pub const HIERARCHY_PROMPT: &str = r#"Evaluate the VISUAL HIERARCHY of the attached advertisement.

Score each item out of 10:
## Focal point
Is there one clear entry point for the eye?
## Reading path
Does the eye move naturally from focal point to message to CTA?
## Contrast and scale
Are size and contrast used to rank elements by importance?
## Whitespace
Does the layout breathe, or do elements compete?

Describe the actual eye path you expect, step by step."#;

pub const COLOR_PROMPT: &str = r##"Evaluate the COLOUR PSYCHOLOGY of the attached advertisement.

Return a JSON object with this EXACT schema:
{
  "dominant_colors": [
    {"name": "deep navy", "approx_hex": "#1B2A4A", "share_percent": 45, "association": "trust, stability"}
  ],
  "accent_color": {"name": "coral", "approx_hex": "#FF6F61", "used_for": "CTA button"},
  "mood": "calm confidence",
  "category_fit": 7,
  "contrast_for_cta": 8,
  "rationale": "One or two sentences."
}

Rules:
- List at most four dominant colours, largest share first.
- Scores are integers 0-10."##;

pub const ACCESSIBILITY_PROMPT: &str = r#"Evaluate the ACCESSIBILITY of the attached advertisement.

Score each item out of 10:
## Text contrast
Estimate whether text meets a 4.5:1 contrast ratio against its background.
## Minimum text size
Would the smallest meaningful text be readable on a phone screen?
## Colour independence
Is any meaning carried by colour alone?
## Motion and flashing
For video frames: any sign of rapid flashing or strobing content?

List each concrete accessibility issue you can see."#;

pub const HOOK_PROMPT: &str = r#"Evaluate the STOP POWER of the opening moment of a video advertisement.

The attached image is the first sampled frame. Score each item out of 10:
## Pattern interrupt
Would it stop a thumb scrolling a social feed?
## Subject clarity
Is it obvious what or who the video is about?
## Branding in the first second
Is the brand or product visible immediately?
## Sound-off readiness
Does the frame work without audio (captions, on-screen text)?"#;

pub const STORYBOARD_PROMPT: &str = r#"Evaluate this moment of a video advertisement as part of its STORYBOARD.

Score each item out of 10:
## Message at this moment
What single idea does this frame communicate?
## Visual continuity
Does it feel like part of one coherent piece (palette, framing, subject)?
## Product presence
Is the product or brand present or implied here?
## Pacing signal
Does the composition suggest energy appropriate to this point in the video?

Name the storyboard beat this frame most likely belongs to: hook, problem, solution, proof, or call to action."#;
