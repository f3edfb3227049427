//! In-process session store.
//!
//! Sessions are keyed by id and individually locked, so one session's
//! long-running generation never blocks another's. Persistence is an
//! external collaborator — nothing here survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::form::FormAnswers;

use super::session::WizardSession;

pub type SharedSession = Arc<Mutex<WizardSession>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session from validated answers and returns its id.
    pub async fn create(&self, answers: FormAnswers) -> Uuid {
        let session = WizardSession::new(answers);
        let id = session.id;
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Explicit teardown. Returns whether the session existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::TalkDuration;

    fn answers() -> FormAnswers {
        FormAnswers {
            idea: "a".repeat(60),
            speaker_background: "b".repeat(60),
            audience_profile: "c".repeat(60),
            duration: TalkDuration::Min30,
            common_objections: "d".repeat(60),
            service_or_product: "e".repeat(60),
            call_to_action: "f".repeat(60),
        }
    }

    #[tokio::test]
    async fn create_get_remove_round_trip() {
        let store = SessionStore::new();
        let id = store.create(answers()).await;

        let session = store.get(id).await.expect("session exists");
        assert_eq!(session.lock().await.id, id);

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
