//! Generation pipeline — one strictly sequential path per artifact:
//! Prompt Builder → Remote Client → Normalizer → Validator → typed result.
//!
//! The outline rides the stateful conversation mode; companion assets use
//! stateless completions and are generated as independent concurrent tasks.

use serde_json::Value;
use tracing::info;

use crate::llm_client::normalize::normalize;
use crate::llm_client::{GenerationBackend, GenerationError};
use crate::models::assets::{CompanionAssets, MarketingPlan, OutreachEmail, SlideStructure};
use crate::models::form::FormAnswers;
use crate::models::outline::Outline;

use super::prompts;
use super::schema;

/// Generates and clamps a talk outline from the wizard answers.
pub async fn generate_outline(
    backend: &dyn GenerationBackend,
    answers: &FormAnswers,
) -> Result<Outline, GenerationError> {
    let prompt = prompts::build_outline_prompt(answers);
    let reply = backend.converse(&prompt).await?;
    let value = normalize(&reply)?;

    let violations = schema::validate_outline(&value);
    if !violations.is_empty() {
        return Err(GenerationError::Schema { violations });
    }

    let draft: schema::OutlineDraft = deserialize_checked(value)?;
    let outline = schema::clamp_outline(draft);

    info!(
        "outline generated: {} chapters, {} sales steps",
        outline.chapters.len(),
        outline.sales_process.len()
    );
    Ok(outline)
}

/// Generates the slide deck skeleton for an accepted outline.
pub async fn generate_slides(
    backend: &dyn GenerationBackend,
    answers: &FormAnswers,
    outline: &Outline,
) -> Result<Vec<SlideStructure>, GenerationError> {
    let prompt = prompts::build_slides_prompt(answers, outline);
    let reply = backend.complete(prompts::ASSETS_SYSTEM, &prompt).await?;
    let value = normalize(&reply)?;

    let violations = schema::validate_slides(&value);
    if !violations.is_empty() {
        return Err(GenerationError::Schema { violations });
    }

    let mut slides: Vec<SlideStructure> = deserialize_checked(value)?;
    slides.sort_by_key(|s| s.number);
    Ok(slides)
}

/// Generates the B2B outreach email for an accepted outline.
pub async fn generate_email(
    backend: &dyn GenerationBackend,
    answers: &FormAnswers,
    outline: &Outline,
) -> Result<OutreachEmail, GenerationError> {
    let prompt = prompts::build_email_prompt(answers, outline);
    let reply = backend.complete(prompts::ASSETS_SYSTEM, &prompt).await?;
    let value = normalize(&reply)?;

    let violations = schema::validate_email(&value);
    if !violations.is_empty() {
        return Err(GenerationError::Schema { violations });
    }

    deserialize_checked(value)
}

/// Generates the marketing plan for an accepted outline.
pub async fn generate_marketing(
    backend: &dyn GenerationBackend,
    answers: &FormAnswers,
    outline: &Outline,
) -> Result<MarketingPlan, GenerationError> {
    let prompt = prompts::build_marketing_prompt(answers, outline);
    let reply = backend.complete(prompts::ASSETS_SYSTEM, &prompt).await?;
    let value = normalize(&reply)?;

    let violations = schema::validate_marketing(&value);
    if !violations.is_empty() {
        return Err(GenerationError::Schema { violations });
    }

    deserialize_checked(value)
}

/// Generates all three companion assets concurrently. Each task runs to
/// completion regardless of its siblings; any single failure fails the
/// joined set.
pub async fn generate_assets(
    backend: &dyn GenerationBackend,
    answers: &FormAnswers,
    outline: &Outline,
) -> Result<CompanionAssets, GenerationError> {
    let (slides, email, marketing) = tokio::join!(
        generate_slides(backend, answers, outline),
        generate_email(backend, answers, outline),
        generate_marketing(backend, answers, outline),
    );

    Ok(CompanionAssets {
        slides: slides?,
        email: email?,
        marketing: marketing?,
    })
}

/// Deserializes a validated value into its typed form. A mismatch here means
/// the validator and the type drifted apart, so it is still reported as a
/// schema failure rather than a panic.
fn deserialize_checked<T: serde::de::DeserializeOwned>(
    value: Value,
) -> Result<T, GenerationError> {
    serde_json::from_value(value).map_err(|e| GenerationError::Schema {
        violations: vec![e.to_string()],
    })
}
