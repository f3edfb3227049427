//! Companion assets generated on demand from an accepted outline.
//! None of these are persisted — each request regenerates them.

use serde::{Deserialize, Serialize};

/// One slide of the deck skeleton, ordered by `number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideStructure {
    pub number: u32,
    pub headline: String,
    pub content: String,
    /// Visual-design suggestion for the slide.
    pub visual: String,
    #[serde(default)]
    pub speaker_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
}

/// B2B outreach email pitching the talk to event organizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachEmail {
    pub subject: String,
    pub body: String,
}

/// One promotion channel in the marketing plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingChannel {
    pub name: String,
    pub tactic: String,
}

/// Marketing plan for promoting the talk and its call-to-action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingPlan {
    pub channels: Vec<MarketingChannel>,
    #[serde(default)]
    pub weekly_schedule: Vec<String>,
    #[serde(default)]
    pub budget_advice: String,
}

/// The joined result of a companion-asset generation round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionAssets {
    pub slides: Vec<SlideStructure>,
    pub email: OutreachEmail,
    pub marketing: MarketingPlan,
}
