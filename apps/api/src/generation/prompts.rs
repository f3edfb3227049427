//! Prompt Builder — all prompt constants and builders for the wizard artifacts.
//!
//! Builders are pure: form answers in, instruction string out. User-supplied
//! text is escaped before embedding so it cannot break the requested JSON
//! reply shape. Fixed element counts come from `schema` so the prompts and
//! the clamp step can never disagree.

use serde_json::json;

use crate::llm_client::prompts::{escape_text, SPECIFICITY_INSTRUCTION};
use crate::models::form::FormAnswers;
use crate::models::outline::Outline;

use super::schema::{CHAPTER_COUNT, POINTS_PER_CHAPTER, SALES_STEP_COUNT};

/// Role and JSON-only preamble for outline generation. The stateful
/// conversation mode has no separate system channel, so this is prepended
/// to the outline prompt itself.
const OUTLINE_SYSTEM: &str = "You are an expert keynote coach and B2B sales strategist \
    who turns a speaker's raw notes into a tightly structured talk plan. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for the companion assets (slides, email, marketing plan).
pub const ASSETS_SYSTEM: &str = "You are an expert presentation designer and B2B marketer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Outline prompt template.
/// Replace: {outline_system}, the seven answer fields, the three count
/// placeholders, and {specificity_instruction}.
const OUTLINE_PROMPT_TEMPLATE: &str = r#"{outline_system}

Build a presentation outline for the talk described below.

SPEAKER'S ANSWERS (verbatim, source of truth):
- Talk idea: "{idea}"
- Speaker background: "{speaker_background}"
- Audience profile: "{audience_profile}"
- Talk duration: {duration} minutes
- Common objections the audience raises: "{common_objections}"
- Service or product to promote: "{service_or_product}"
- Call to action: "{call_to_action}"

Return a JSON object with this EXACT schema:
{
  "chapters": [
    {"title": "Chapter title", "points": ["First point", "Second point", "Third point"]}
  ],
  "opening_styles": ["A bold question to the room", "A short personal story"],
  "time_distribution": "How to split {duration} minutes across the chapters",
  "discussion_questions": {"Chapter title": "One discussion question for that chapter"},
  "sales_guide": "How to weave the product into the talk without losing the room's trust",
  "follow_up_plan": "What the speaker should do in the week after the talk",
  "motivation": "One short motivational message for the speaker",
  "sales_process": [
    {"title": "Step title", "description": "What the speaker does in this step", "order": 1}
  ]
}

HARD RULES:
1. EXACTLY {chapter_count} chapters, each with EXACTLY {points_per_chapter} points
2. EXACTLY {sales_step_count} sales_process steps, with order running 1 to {sales_step_count}
3. Address the listed objections inside the chapters, not in a separate section
4. The sales_process must land on the stated call to action
5. Key discussion_questions by the exact chapter titles you chose

{specificity_instruction}"#;

/// Slide-deck prompt template.
/// Replace: {outline_digest}, {audience_profile}, {duration},
/// {specificity_instruction}.
const SLIDES_PROMPT_TEMPLATE: &str = r#"Design a slide deck skeleton for the talk outlined below.

ACCEPTED OUTLINE (source of truth):
{outline_digest}

AUDIENCE: "{audience_profile}"
DURATION: {duration} minutes

Return a JSON ARRAY of slide objects:
[
  {
    "number": 1,
    "headline": "Slide headline",
    "content": "What the slide says, in one or two sentences",
    "visual": "A concrete visual-design suggestion for this slide",
    "speaker_notes": "What the speaker says while this slide is up",
    "timing": "Optional: minutes to spend here",
    "engagement": "Optional: a question or interaction for the room",
    "transition": "Optional: how to bridge into the next slide"
  }
]

HARD RULES:
1. Open with a title slide and close with the call to action
2. Cover every chapter point from the outline on its own slide
3. `number` must run sequentially from 1 with no gaps
4. `headline`, `content`, and `visual` must never be empty

{specificity_instruction}"#;

/// Outreach email prompt template.
/// Replace: {speaker_background}, {service_or_product}, {call_to_action},
/// {outline_digest}, {specificity_instruction}.
const EMAIL_PROMPT_TEMPLATE: &str = r#"Write a short B2B outreach email offering this talk to event and community organizers.

SPEAKER: "{speaker_background}"
PRODUCT CONTEXT: "{service_or_product}"
DESIRED NEXT STEP: "{call_to_action}"

TALK SUMMARY:
{outline_digest}

Return a JSON object:
{
  "subject": "Email subject line, under 60 characters",
  "body": "The full email body, 120-180 words, ending on the next step"
}

HARD RULES:
1. Lead with the concrete outcome the organizer's audience gets
2. One paragraph of credibility drawn from the speaker background, no resume dump
3. No pushy sales language; the talk is the offer, not the product

{specificity_instruction}"#;

/// Marketing plan prompt template.
/// Replace: {audience_profile}, {service_or_product}, {call_to_action},
/// {outline_digest}, {specificity_instruction}.
const MARKETING_PROMPT_TEMPLATE: &str = r#"Build a marketing plan for promoting this talk and its call to action.

TARGET AUDIENCE: "{audience_profile}"
PRODUCT CONTEXT: "{service_or_product}"
CALL TO ACTION: "{call_to_action}"

TALK SUMMARY:
{outline_digest}

Return a JSON object:
{
  "channels": [
    {"name": "Channel name", "tactic": "How to use this channel for this specific talk"}
  ],
  "weekly_schedule": ["Week 1: ...", "Week 2: ...", "Week 3: ...", "Week 4: ..."],
  "budget_advice": "Where a small budget moves the needle, and where it does not"
}

HARD RULES:
1. 3 to 5 channels, each tactic tied to where this audience actually spends time
2. The weekly schedule covers the four weeks before the talk
3. Every item must reference the talk's content or audience, never generic advice

{specificity_instruction}"#;

/// Builds the outline generation instruction from the wizard answers.
pub fn build_outline_prompt(answers: &FormAnswers) -> String {
    OUTLINE_PROMPT_TEMPLATE
        .replace("{outline_system}", OUTLINE_SYSTEM)
        .replace("{idea}", &escape_text(&answers.idea))
        .replace(
            "{speaker_background}",
            &escape_text(&answers.speaker_background),
        )
        .replace(
            "{audience_profile}",
            &escape_text(&answers.audience_profile),
        )
        .replace("{duration}", &answers.duration.minutes().to_string())
        .replace(
            "{common_objections}",
            &escape_text(&answers.common_objections),
        )
        .replace(
            "{service_or_product}",
            &escape_text(&answers.service_or_product),
        )
        .replace("{call_to_action}", &escape_text(&answers.call_to_action))
        .replace("{chapter_count}", &CHAPTER_COUNT.to_string())
        .replace("{points_per_chapter}", &POINTS_PER_CHAPTER.to_string())
        .replace("{sales_step_count}", &SALES_STEP_COUNT.to_string())
        .replace("{specificity_instruction}", SPECIFICITY_INSTRUCTION)
}

pub fn build_slides_prompt(answers: &FormAnswers, outline: &Outline) -> String {
    SLIDES_PROMPT_TEMPLATE
        .replace("{outline_digest}", &outline_digest(outline))
        .replace(
            "{audience_profile}",
            &escape_text(&answers.audience_profile),
        )
        .replace("{duration}", &answers.duration.minutes().to_string())
        .replace("{specificity_instruction}", SPECIFICITY_INSTRUCTION)
}

pub fn build_email_prompt(answers: &FormAnswers, outline: &Outline) -> String {
    EMAIL_PROMPT_TEMPLATE
        .replace(
            "{speaker_background}",
            &escape_text(&answers.speaker_background),
        )
        .replace(
            "{service_or_product}",
            &escape_text(&answers.service_or_product),
        )
        .replace("{call_to_action}", &escape_text(&answers.call_to_action))
        .replace("{outline_digest}", &outline_digest(outline))
        .replace("{specificity_instruction}", SPECIFICITY_INSTRUCTION)
}

pub fn build_marketing_prompt(answers: &FormAnswers, outline: &Outline) -> String {
    MARKETING_PROMPT_TEMPLATE
        .replace(
            "{audience_profile}",
            &escape_text(&answers.audience_profile),
        )
        .replace(
            "{service_or_product}",
            &escape_text(&answers.service_or_product),
        )
        .replace("{call_to_action}", &escape_text(&answers.call_to_action))
        .replace("{outline_digest}", &outline_digest(outline))
        .replace("{specificity_instruction}", SPECIFICITY_INSTRUCTION)
}

/// Serializes the accepted outline's load-bearing content for downstream
/// prompts: chapter titles and points plus the sales-process step titles.
fn outline_digest(outline: &Outline) -> String {
    let digest = json!({
        "chapters": outline
            .chapters
            .iter()
            .map(|ch| {
                json!({
                    "title": ch.title,
                    "points": ch.points.iter().map(|p| p.content.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
        "sales_process": outline
            .sales_process
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&digest).unwrap_or_else(|_| "{}".to_string())
}
