//! Per-chat conversation state and the turn-processing entry point.

use crate::command::Command;
use crate::error::TurnError;
use crate::prompt::PromptBuilder;
use crate::selector::ResponseSelector;
use crate::window::ContextWindow;
use banter_types::{ContentFilter, Generator, QualityRanker, SamplingConfig, Tokenizer};
use std::sync::Arc;
use std::time::Duration;

/// Confirmation after `/restart` wipes the conversation.
pub const RESTART_REPLY: &str = "Okay, clean slate. What were we talking about?";

/// Confirmation when the content filter has just been switched off.
pub const FILTER_OFF_REPLY: &str = "Filter's off. I take no responsibility for what follows.";

/// Confirmation when the content filter has just been switched on.
pub const FILTER_ON_REPLY: &str = "Filter's back on. Keeping it clean.";

/// Shared, read-only handles to the model collaborators.
///
/// Built once at process start and passed into every session — no
/// hidden globals, and tests swap in fakes freely.
#[derive(Clone)]
pub struct ModelHandles {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub generator: Arc<dyn Generator>,
    pub filter: Arc<dyn ContentFilter>,
    pub ranker: Arc<dyn QualityRanker>,
}

/// Per-session knobs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Maximum number of turns retained as context.
    pub window_size: usize,
    /// Independent draws per turn on the normal text path.
    pub candidate_count: usize,
    /// Initial content-filter state.
    pub filter_enabled: bool,
    pub sampling: SamplingConfig,
    /// Canned reply when nothing survives selection.
    pub default_answer: String,
    /// Budget for a single generation call.
    pub generation_timeout: Duration,
}

/// One chat's conversation: context window, filter flag, and the
/// pipeline components that produce replies.
///
/// A session lives for the process lifetime. Concurrent turns for the
/// same chat must be serialized by the caller (see `SessionRegistry`).
pub struct Session {
    chat_id: i64,
    window: ContextWindow,
    filter_enabled: bool,
    candidate_count: usize,
    prompt_builder: PromptBuilder,
    selector: ResponseSelector,
}

impl Session {
    pub fn new(chat_id: i64, handles: ModelHandles, settings: SessionSettings) -> Self {
        Self {
            chat_id,
            window: ContextWindow::new(settings.window_size),
            filter_enabled: settings.filter_enabled,
            candidate_count: settings.candidate_count,
            prompt_builder: PromptBuilder::new(handles.tokenizer.clone()),
            selector: ResponseSelector::new(
                handles,
                settings.sampling,
                settings.default_answer,
                settings.generation_timeout,
            ),
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn filter_enabled(&self) -> bool {
        self.filter_enabled
    }

    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    /// Route one incoming message: a recognized command runs its handler
    /// and skips generation entirely; anything else is a dialogue turn.
    pub async fn respond(&mut self, text: &str) -> Result<String, TurnError> {
        if let Some(command) = Command::parse(text) {
            return Ok(self.dispatch(command));
        }
        self.process_turn(text).await
    }

    /// Run a command handler. The command set is closed, so dispatch is
    /// a plain match.
    pub fn dispatch(&mut self, command: Command) -> String {
        match command {
            Command::Restart => self.restart(),
            Command::ToggleFilter => self.toggle_filter(),
        }
    }

    /// Process one dialogue turn and return the chosen reply text.
    ///
    /// Session state is written only after a winner exists — a failed
    /// turn leaves the context exactly as it was.
    pub async fn process_turn(&mut self, utterance: &str) -> Result<String, TurnError> {
        let prompt = self
            .prompt_builder
            .build(self.window.tokens(), utterance)
            .await?;
        let result = self
            .selector
            .select(&prompt, self.candidate_count, self.filter_enabled)
            .await?;

        self.window.append(result.tokens);
        self.window.trim();
        tracing::debug!(
            chat_id = self.chat_id,
            context_len = self.window.token_len(),
            turns = self.window.turn_count(),
            "turn complete"
        );
        Ok(result.text)
    }

    /// Forget all previous turns. Window size and filter state survive.
    pub fn restart(&mut self) -> String {
        self.window.clear();
        RESTART_REPLY.to_string()
    }

    /// Flip the content filter and confirm the resulting state.
    pub fn toggle_filter(&mut self) -> String {
        self.filter_enabled = !self.filter_enabled;
        let reply = if self.filter_enabled {
            FILTER_ON_REPLY
        } else {
            FILTER_OFF_REPLY
        };
        reply.to_string()
    }
}
