//! Schema validation and defensive clamping for generated artifacts.
//!
//! The upstream model is asked for exact shapes but never guaranteed to honor
//! them. Validation collects violated constraints without mutating input;
//! extra unknown fields are accepted. The clamp step then pads or truncates
//! an accepted outline draft to the canonical counts.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::models::outline::{Chapter, ChapterPoint, Outline, SalesProcessStep};

/// Canonical generated-outline shape. The prompts request these counts and
/// the clamp enforces them.
pub const CHAPTER_COUNT: usize = 4;
pub const POINTS_PER_CHAPTER: usize = 3;
pub const SALES_STEP_COUNT: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Draft wire shapes (model reply, before ids are assigned)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OutlineDraft {
    pub chapters: Vec<ChapterDraft>,
    #[serde(default)]
    pub opening_styles: Vec<String>,
    #[serde(default)]
    pub time_distribution: String,
    #[serde(default)]
    pub discussion_questions: BTreeMap<String, String>,
    #[serde(default)]
    pub sales_guide: String,
    #[serde(default)]
    pub follow_up_plan: String,
    #[serde(default)]
    pub motivation: String,
    pub sales_process: Vec<SalesStepDraft>,
}

#[derive(Debug, Deserialize)]
pub struct ChapterDraft {
    pub title: String,
    pub points: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SalesStepDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub order: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Validators
// ────────────────────────────────────────────────────────────────────────────

/// Checks the minimum required outline shape. Accepts both the draft wire
/// form (points as strings) and the domain form (points as objects), so the
/// fallback outline validates with the same predicate as generated ones.
pub fn validate_outline(value: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    let Some(object) = value.as_object() else {
        return vec!["outline must be a JSON object".to_string()];
    };

    match object.get("chapters").and_then(Value::as_array) {
        None => violations.push("'chapters' must be a non-empty array".to_string()),
        Some(chapters) if chapters.is_empty() => {
            violations.push("'chapters' must be a non-empty array".to_string())
        }
        Some(chapters) => {
            for (i, chapter) in chapters.iter().enumerate() {
                if !has_nonempty_string(chapter, "title") {
                    violations.push(format!("chapter {} is missing a title", i + 1));
                }
                match chapter.get("points").and_then(Value::as_array) {
                    None => violations.push(format!("chapter {} has no points array", i + 1)),
                    Some(points) if points.is_empty() => {
                        violations.push(format!("chapter {} has no points", i + 1))
                    }
                    Some(points) => {
                        if !points.iter().all(is_nonempty_point) {
                            violations.push(format!("chapter {} has an empty point", i + 1));
                        }
                    }
                }
            }
        }
    }

    match object.get("sales_process").and_then(Value::as_array) {
        None => violations.push("'sales_process' must be a non-empty array".to_string()),
        Some(steps) if steps.is_empty() => {
            violations.push("'sales_process' must be a non-empty array".to_string())
        }
        Some(steps) => {
            for (i, step) in steps.iter().enumerate() {
                if !has_nonempty_string(step, "title") || !has_nonempty_string(step, "description")
                {
                    violations.push(format!(
                        "sales step {} is missing a title or description",
                        i + 1
                    ));
                }
            }
        }
    }

    violations
}

/// Checks a slide-deck reply: a non-empty array where every slide carries a
/// numeric ordinal and non-empty headline/content/visual strings.
pub fn validate_slides(value: &Value) -> Vec<String> {
    let Some(slides) = value.as_array() else {
        return vec!["slides reply must be a JSON array".to_string()];
    };
    if slides.is_empty() {
        return vec!["slides array must not be empty".to_string()];
    }

    let mut violations = Vec::new();
    for (i, slide) in slides.iter().enumerate() {
        if slide.get("number").and_then(Value::as_u64).is_none() {
            violations.push(format!("slide {} is missing a numeric 'number'", i + 1));
        }
        for field in ["headline", "content", "visual"] {
            if !has_nonempty_string(slide, field) {
                violations.push(format!("slide {} is missing '{field}'", i + 1));
            }
        }
    }
    violations
}

/// Checks an outreach-email reply: non-empty subject and body strings.
pub fn validate_email(value: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    for field in ["subject", "body"] {
        if !has_nonempty_string(value, field) {
            violations.push(format!("email is missing '{field}'"));
        }
    }
    violations
}

/// Checks a marketing-plan reply: a non-empty channel list with named
/// tactics.
pub fn validate_marketing(value: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    match value.get("channels").and_then(Value::as_array) {
        None => violations.push("'channels' must be a non-empty array".to_string()),
        Some(channels) if channels.is_empty() => {
            violations.push("'channels' must be a non-empty array".to_string())
        }
        Some(channels) => {
            for (i, channel) in channels.iter().enumerate() {
                if !has_nonempty_string(channel, "name") || !has_nonempty_string(channel, "tactic")
                {
                    violations.push(format!("channel {} is missing a name or tactic", i + 1));
                }
            }
        }
    }

    violations
}

fn has_nonempty_string(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn is_nonempty_point(point: &Value) -> bool {
    match point {
        Value::String(s) => !s.trim().is_empty(),
        other => has_nonempty_string(other, "content"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Clamp
// ────────────────────────────────────────────────────────────────────────────

/// Pads or truncates an accepted draft to the canonical counts and assigns
/// local ids. Sales steps are sorted by their declared order first, then
/// renumbered 1..N so order values are unique and monotonic.
pub fn clamp_outline(mut draft: OutlineDraft) -> Outline {
    draft.chapters.truncate(CHAPTER_COUNT);
    while draft.chapters.len() < CHAPTER_COUNT {
        let n = draft.chapters.len() + 1;
        draft.chapters.push(ChapterDraft {
            title: format!("Chapter {n}"),
            points: Vec::new(),
        });
    }

    let chapters = draft
        .chapters
        .into_iter()
        .map(|mut ch| {
            ch.points.truncate(POINTS_PER_CHAPTER);
            while ch.points.len() < POINTS_PER_CHAPTER {
                ch.points.push("To be filled in".to_string());
            }
            Chapter::new(ch.title, ch.points.into_iter().map(ChapterPoint::new).collect())
        })
        .collect();

    draft.sales_process.sort_by_key(|s| s.order);
    draft.sales_process.truncate(SALES_STEP_COUNT);
    while draft.sales_process.len() < SALES_STEP_COUNT {
        let n = draft.sales_process.len() + 1;
        draft.sales_process.push(SalesStepDraft {
            title: format!("Step {n}"),
            description: "To be filled in".to_string(),
            order: n as u32,
        });
    }

    let sales_process = draft
        .sales_process
        .into_iter()
        .enumerate()
        .map(|(i, s)| SalesProcessStep::new(s.title, s.description, i as u32 + 1))
        .collect();

    Outline {
        chapters,
        opening_styles: draft.opening_styles,
        time_distribution: draft.time_distribution,
        discussion_questions: draft.discussion_questions,
        sales_guide: draft.sales_guide,
        follow_up_plan: draft.follow_up_plan,
        motivation: draft.motivation,
        sales_process,
    }
}
