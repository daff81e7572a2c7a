//! Per-chat session registry.

use crate::session::{ModelHandles, Session, SessionSettings};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns every live session, one per chat.
///
/// Each session sits behind its own mutex: turns for the same chat
/// serialize, turns for different chats run in parallel. Sessions are
/// created lazily on a chat's first message and live for the process
/// lifetime.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
    handles: ModelHandles,
    settings: SessionSettings,
}

impl SessionRegistry {
    pub fn new(handles: ModelHandles, settings: SessionSettings) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            handles,
            settings,
        }
    }

    /// Fetch the session for `chat_id`, creating it on first contact.
    pub async fn get_or_create(&self, chat_id: i64) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(chat_id)
            .or_insert_with(|| {
                tracing::info!(chat_id, "starting session");
                Arc::new(Mutex::new(Session::new(
                    chat_id,
                    self.handles.clone(),
                    self.settings.clone(),
                )))
            })
            .clone()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
