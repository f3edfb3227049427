//! Wizard session — the orchestration state for one talk-building flow.
//!
//! The session owns the form answers, the accepted outline, and the UI-facing
//! loading/progress/error fields. Every generation failure stops here: it is
//! converted into one user-facing message plus a diagnostic log entry, and
//! the caller always keeps three ways out — retry, fallback, or a revised
//! form in a fresh session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::generation::{fallback, pipeline};
use crate::llm_client::{GenerationBackend, GenerationError};
use crate::models::assets::CompanionAssets;
use crate::models::form::FormAnswers;
use crate::models::outline::{Chapter, Outline};
use crate::notify::Notifier;

/// How many user-initiated generation attempts the interface offers before
/// disabling the retry affordance. Display gating only — the operation
/// itself carries no extra restriction.
pub const MAX_VISIBLE_RETRIES: u32 = 3;

#[derive(Debug)]
pub struct WizardSession {
    pub id: Uuid,
    pub answers: FormAnswers,
    pub outline: Option<Outline>,
    /// Denormalized convenience view over `outline.chapters`, refreshed on
    /// every outline change.
    pub chapters: Vec<Chapter>,
    pub loading: bool,
    pub progress: String,
    pub error: Option<String>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(answers: FormAnswers) -> Self {
        Self {
            id: Uuid::new_v4(),
            answers,
            outline: None,
            chapters: Vec::new(),
            loading: false,
            progress: "Ready to generate".to_string(),
            error: None,
            attempts: 0,
            created_at: Utc::now(),
        }
    }

    /// Runs the outline pipeline and stores either the result or a
    /// categorized error message. Never propagates the failure further.
    pub async fn generate_outline(&mut self, backend: &dyn GenerationBackend, notifier: &Notifier) {
        self.error = None;
        self.loading = true;
        self.attempts += 1;
        self.progress = format!(
            "Generating your outline (attempt {} of {})...",
            self.attempts.min(MAX_VISIBLE_RETRIES),
            MAX_VISIBLE_RETRIES
        );

        match pipeline::generate_outline(backend, &self.answers).await {
            Ok(outline) => {
                info!("session {}: outline accepted", self.id);
                self.install_outline(outline);
                self.progress = "Outline ready".to_string();

                // Best-effort analytics; the spawned task owns the outcome.
                if let Some(outline) = &self.outline {
                    notifier.send_session_snapshot(self.id, &self.answers, outline);
                }
            }
            Err(err) => {
                error!("session {}: outline generation failed: {err}", self.id);
                if !err.is_retry_eligible() {
                    // Retrying cannot fix a configuration problem; close the
                    // retry affordance and leave fallback or form revision.
                    self.attempts = MAX_VISIBLE_RETRIES;
                }
                self.error = Some(err.user_message().to_string());
                self.progress = "Generation failed".to_string();
            }
        }

        self.loading = false;
    }

    /// Generates the companion assets for the accepted outline. The session
    /// records the failure message, and the typed error is also returned so
    /// the HTTP layer can pick the right status.
    pub async fn generate_assets(
        &mut self,
        backend: &dyn GenerationBackend,
    ) -> Result<CompanionAssets, GenerationError> {
        let Some(outline) = self.outline.clone() else {
            return Err(GenerationError::Schema {
                violations: vec!["no accepted outline to build assets from".to_string()],
            });
        };

        self.error = None;
        self.loading = true;
        self.progress = "Generating slides, email, and marketing plan...".to_string();

        let result = pipeline::generate_assets(backend, &self.answers, &outline).await;

        match &result {
            Ok(_) => self.progress = "Companion assets ready".to_string(),
            Err(err) => {
                error!("session {}: asset generation failed: {err}", self.id);
                self.error = Some(err.user_message().to_string());
                self.progress = "Generation failed".to_string();
            }
        }

        self.loading = false;
        result
    }

    /// Installs the fixed fallback outline. No network, always succeeds,
    /// clears any prior error.
    pub fn use_fallback_outline(&mut self) {
        self.install_outline(fallback::fallback_outline());
        self.error = None;
        self.loading = false;
        self.progress = "Using the prepared outline".to_string();
        info!("session {}: fallback outline installed", self.id);
    }

    /// Renames the identified chapter. Unknown ids are a no-op.
    pub fn edit_chapter_title(&mut self, chapter_id: Uuid, new_title: &str) {
        let Some(outline) = self.outline.as_mut() else {
            return;
        };
        if let Some(chapter) = outline.chapters.iter_mut().find(|c| c.id == chapter_id) {
            chapter.title = new_title.to_string();
            self.refresh_chapters();
        }
    }

    /// Rewrites the identified point's content. Unknown ids are a no-op.
    pub fn edit_chapter_point(&mut self, chapter_id: Uuid, point_id: Uuid, new_content: &str) {
        let Some(outline) = self.outline.as_mut() else {
            return;
        };
        let Some(chapter) = outline.chapters.iter_mut().find(|c| c.id == chapter_id) else {
            return;
        };
        if let Some(point) = chapter.points.iter_mut().find(|p| p.id == point_id) {
            point.content = new_content.to_string();
            self.refresh_chapters();
        }
    }

    pub fn can_retry(&self) -> bool {
        self.attempts < MAX_VISIBLE_RETRIES
    }

    fn install_outline(&mut self, mut outline: Outline) {
        outline.sort_sales_process();
        self.chapters = outline.chapters.clone();
        self.outline = Some(outline);
    }

    fn refresh_chapters(&mut self) {
        self.chapters = self
            .outline
            .as_ref()
            .map(|o| o.chapters.clone())
            .unwrap_or_default();
    }
}

/// Snapshot of a session for the HTTP layer.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub loading: bool,
    pub progress: String,
    pub error: Option<String>,
    pub attempts: u32,
    pub can_retry: bool,
    pub outline: Option<Outline>,
    pub chapters: Vec<Chapter>,
}

impl From<&WizardSession> for SessionView {
    fn from(session: &WizardSession) -> Self {
        Self {
            session_id: session.id,
            loading: session.loading,
            progress: session.progress.clone(),
            error: session.error.clone(),
            attempts: session.attempts,
            can_retry: session.can_retry(),
            outline: session.outline.clone(),
            chapters: session.chapters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::schema::{CHAPTER_COUNT, SALES_STEP_COUNT};
    use crate::models::form::TalkDuration;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    }

    impl ScriptedBackend {
        fn new(replies: impl IntoIterator<Item = Result<String, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
            }
        }

        fn next(&self) -> Result<String, GenerationError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyReply))
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, GenerationError> {
            self.next()
        }

        async fn converse(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.next()
        }
    }

    fn answers() -> FormAnswers {
        FormAnswers {
            idea: "a".repeat(60),
            speaker_background: "b".repeat(60),
            audience_profile: "c".repeat(60),
            duration: TalkDuration::Min60,
            common_objections: "d".repeat(60),
            service_or_product: "e".repeat(60),
            call_to_action: "f".repeat(60),
        }
    }

    fn clean_outline_reply() -> String {
        json!({
            "chapters": (0..4).map(|i| json!({
                "title": format!("Chapter {}", i + 1),
                "points": ["First", "Second", "Third"],
            })).collect::<Vec<_>>(),
            "sales_process": (0..10).map(|i| json!({
                "title": format!("Step {}", i + 1),
                "description": "Do it",
                "order": i + 1,
            })).collect::<Vec<_>>(),
        })
        .to_string()
    }

    fn notifier() -> Notifier {
        Notifier::new(None)
    }

    #[tokio::test]
    async fn successful_generation_populates_state() {
        let backend = ScriptedBackend::new([Ok(clean_outline_reply())]);
        let mut session = WizardSession::new(answers());

        session.generate_outline(&backend, &notifier()).await;

        assert!(!session.loading);
        assert!(session.error.is_none());
        assert_eq!(session.chapters.len(), CHAPTER_COUNT);
        assert_eq!(
            session.outline.as_ref().unwrap().sales_process.len(),
            SALES_STEP_COUNT
        );
        assert_eq!(session.attempts, 1);
    }

    #[tokio::test]
    async fn exhausted_network_failure_sets_connectivity_error() {
        let backend = ScriptedBackend::new([Err(GenerationError::Network {
            attempts: 3,
            last: "connection refused".to_string(),
        })]);
        let mut session = WizardSession::new(answers());

        session.generate_outline(&backend, &notifier()).await;

        assert!(!session.loading);
        assert_eq!(
            session.error.as_deref(),
            Some("We could not reach the generation service. Please try again.")
        );
        assert!(session.chapters.is_empty());
        assert!(session.outline.is_none());
    }

    #[tokio::test]
    async fn fallback_after_failure_clears_error_and_installs_chapters() {
        let backend = ScriptedBackend::new([Err(GenerationError::Timeout { polls: 90 })]);
        let mut session = WizardSession::new(answers());

        session.generate_outline(&backend, &notifier()).await;
        assert!(session.error.is_some());

        session.use_fallback_outline();

        assert!(session.error.is_none());
        assert_eq!(session.chapters.len(), fallback::FALLBACK_CHAPTER_COUNT);
        assert!(session.outline.is_some());
    }

    #[tokio::test]
    async fn configuration_failure_uses_the_configuration_message() {
        let backend = ScriptedBackend::new([Err(GenerationError::Configuration(
            "LLM_API_KEY is not set".to_string(),
        ))]);
        let mut session = WizardSession::new(answers());

        session.generate_outline(&backend, &notifier()).await;

        assert!(session.error.as_deref().unwrap().contains("not configured"));
        // A configuration problem is not fixable by retrying.
        assert!(!session.can_retry());
    }

    #[tokio::test]
    async fn retry_counter_gates_the_visible_retry_affordance() {
        let mut session = WizardSession::new(answers());
        assert!(session.can_retry());

        for _ in 0..MAX_VISIBLE_RETRIES {
            let backend = ScriptedBackend::new([Err(GenerationError::Timeout { polls: 90 })]);
            session.generate_outline(&backend, &notifier()).await;
        }

        assert_eq!(session.attempts, MAX_VISIBLE_RETRIES);
        assert!(!session.can_retry());
    }

    #[tokio::test]
    async fn edit_chapter_title_touches_only_the_target() {
        let mut session = WizardSession::new(answers());
        session.use_fallback_outline();

        let target = session.chapters[1].id;
        let before: Vec<String> = session.chapters.iter().map(|c| c.title.clone()).collect();
        let questions_before = session
            .outline
            .as_ref()
            .unwrap()
            .discussion_questions
            .clone();

        session.edit_chapter_title(target, "A sharper second chapter");

        let outline = session.outline.as_ref().unwrap();
        assert_eq!(outline.chapters[1].title, "A sharper second chapter");
        assert_eq!(session.chapters[1].title, "A sharper second chapter");
        assert_eq!(outline.chapters[0].title, before[0]);
        assert_eq!(outline.chapters[2].title, before[2]);
        assert_eq!(outline.discussion_questions, questions_before);
    }

    #[tokio::test]
    async fn edit_chapter_point_touches_only_the_target() {
        let mut session = WizardSession::new(answers());
        session.use_fallback_outline();

        let chapter_id = session.chapters[0].id;
        let point_id = session.chapters[0].points[2].id;
        let sibling_before = session.chapters[0].points[0].content.clone();

        session.edit_chapter_point(chapter_id, point_id, "A rewritten closing point");

        let chapter = &session.outline.as_ref().unwrap().chapters[0];
        assert_eq!(chapter.points[2].content, "A rewritten closing point");
        assert_eq!(chapter.points[0].content, sibling_before);
        assert_eq!(session.chapters[0].points[2].content, "A rewritten closing point");
    }

    #[tokio::test]
    async fn edits_with_unknown_ids_are_noops() {
        let mut session = WizardSession::new(answers());
        session.use_fallback_outline();
        let before: Vec<String> = session.chapters.iter().map(|c| c.title.clone()).collect();

        session.edit_chapter_title(Uuid::new_v4(), "Should not land");
        session.edit_chapter_point(session.chapters[0].id, Uuid::new_v4(), "Should not land");
        session.edit_chapter_point(Uuid::new_v4(), Uuid::new_v4(), "Should not land");

        let after: Vec<String> = session.chapters.iter().map(|c| c.title.clone()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn edits_before_any_outline_are_noops() {
        let mut session = WizardSession::new(answers());
        session.edit_chapter_title(Uuid::new_v4(), "Nothing to edit");
        assert!(session.outline.is_none());
        assert!(session.chapters.is_empty());
    }

    #[tokio::test]
    async fn assets_require_an_accepted_outline() {
        let backend = ScriptedBackend::new([]);
        let mut session = WizardSession::new(answers());
        let err = session.generate_assets(&backend).await.unwrap_err();
        assert!(matches!(err, GenerationError::Schema { .. }));
    }

    #[tokio::test]
    async fn asset_failure_sets_the_session_error() {
        let backend = ScriptedBackend::new([
            Ok("no json".to_string()),
            Ok("no json".to_string()),
            Ok("no json".to_string()),
        ]);
        let mut session = WizardSession::new(answers());
        session.use_fallback_outline();

        let result = session.generate_assets(&backend).await;

        assert!(result.is_err());
        assert!(!session.loading);
        assert!(session.error.is_some());
    }
}
