//! Analytics webhook — fire-and-forget delivery of the session payload.
//!
//! Delivery failures are logged and swallowed; they must never fail the
//! generation flow or surface to the user.

use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::form::FormAnswers;
use crate::models::outline::Outline;

#[derive(Clone)]
pub struct Notifier {
    client: Client,
    url: Option<String>,
}

impl Notifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    /// Posts the full session payload to the collector in the background.
    /// Returns immediately; the spawned task owns the outcome.
    pub fn send_session_snapshot(
        &self,
        session_id: Uuid,
        answers: &FormAnswers,
        outline: &Outline,
    ) {
        let Some(url) = self.url.clone() else {
            debug!("analytics webhook not configured, skipping snapshot");
            return;
        };

        let payload = json!({
            "session_id": session_id,
            "answers": answers,
            "outline": outline,
            "generated_at": Utc::now(),
        });
        let client = self.client.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        "analytics webhook returned {} for session {session_id}",
                        response.status()
                    );
                }
                Ok(_) => debug!("session {session_id} snapshot delivered"),
                Err(e) => warn!("analytics webhook delivery failed for session {session_id}: {e}"),
            }
        });
    }
}
