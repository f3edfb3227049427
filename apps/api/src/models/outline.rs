//! The generated talk outline and its owned entities.
//!
//! Chapter, point, and sales-step ids are opaque and generated locally —
//! the upstream model never supplies them, and they stay stable across edits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One bullet-level sub-point inside a chapter. User-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterPoint {
    pub id: Uuid,
    pub content: String,
}

impl ChapterPoint {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
        }
    }
}

/// A titled section of the talk. Owned exclusively by the outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub points: Vec<ChapterPoint>,
}

impl Chapter {
    pub fn new(title: impl Into<String>, points: Vec<ChapterPoint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            points,
        }
    }
}

/// One ordered stage of the in-talk persuasion narrative.
/// `order` alone defines display sequence; generation order is not trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesProcessStep {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order: u32,
}

impl SalesProcessStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            order,
        }
    }
}

/// The structured plan of a talk: ordered chapters plus advisory narrative
/// fields and the ordered sales-process sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    pub chapters: Vec<Chapter>,
    pub opening_styles: Vec<String>,
    pub time_distribution: String,
    /// Discussion questions keyed by chapter title.
    pub discussion_questions: BTreeMap<String, String>,
    pub sales_guide: String,
    pub follow_up_plan: String,
    pub motivation: String,
    pub sales_process: Vec<SalesProcessStep>,
}

impl Outline {
    /// Re-sorts the sales process by its explicit `order` field.
    pub fn sort_sales_process(&mut self) {
        self.sales_process.sort_by_key(|step| step.order);
    }
}
