//! Sliding context window over the conversation token tape.

use banter_types::TokenId;
use std::collections::VecDeque;

/// The rolling token context fed to the generative model.
///
/// `turn_sizes` keeps one entry per retained turn — the number of tokens
/// that turn appended (wrapped utterance plus the chosen continuation).
/// The sum of `turn_sizes` always equals `tokens.len()`, so evicting the
/// oldest turn drains exactly its tokens from the front of the tape.
/// This is a recency window, not a summarizer: old turns are simply
/// forgotten to keep prompt length, latency, and memory bounded.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    tokens: Vec<TokenId>,
    turn_sizes: VecDeque<usize>,
    window_size: usize,
}

impl ContextWindow {
    /// Create an empty window retaining at most `window_size` turns.
    pub fn new(window_size: usize) -> Self {
        Self {
            tokens: Vec::new(),
            turn_sizes: VecDeque::new(),
            window_size,
        }
    }

    /// The current context token tape.
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Number of tokens currently retained.
    pub fn token_len(&self) -> usize {
        self.tokens.len()
    }

    /// Number of turns currently retained.
    pub fn turn_count(&self) -> usize {
        self.turn_sizes.len()
    }

    /// Per-turn token counts, oldest first.
    pub fn turn_sizes(&self) -> &VecDeque<usize> {
        &self.turn_sizes
    }

    /// Maximum number of retained turns.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.turn_sizes.is_empty()
    }

    /// Record a completed turn: `new_context` replaces the tape and the
    /// growth relative to the old tape is ledgered as this turn's size.
    pub fn append(&mut self, new_context: Vec<TokenId>) {
        let appended = new_context.len().saturating_sub(self.tokens.len());
        self.tokens = new_context;
        self.turn_sizes.push_back(appended);
    }

    /// Evict oldest turns until at most `window_size` remain.
    ///
    /// Turns grow by one per `append`, so in steady state this drops at
    /// most one turn per call.
    pub fn trim(&mut self) {
        while self.turn_sizes.len() > self.window_size {
            if let Some(evicted) = self.turn_sizes.pop_front() {
                self.tokens.drain(..evicted.min(self.tokens.len()));
            }
        }
        debug_assert_eq!(self.tokens.len(), self.turn_sizes.iter().sum::<usize>());
    }

    /// Forget everything. The window size is kept.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.turn_sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_turn(window: &mut ContextWindow, appended: &[TokenId]) {
        let mut next: Vec<TokenId> = window.tokens().to_vec();
        next.extend_from_slice(appended);
        window.append(next);
        window.trim();
    }

    #[test]
    fn starts_empty() {
        let window = ContextWindow::new(4);
        assert!(window.is_empty());
        assert_eq!(window.turn_count(), 0);
        assert_eq!(window.window_size(), 4);
    }

    #[test]
    fn ledger_sum_matches_tape_length() {
        let mut window = ContextWindow::new(3);
        push_turn(&mut window, &[1, 2, 3]);
        push_turn(&mut window, &[4, 5]);
        push_turn(&mut window, &[6]);
        assert_eq!(window.token_len(), 6);
        assert_eq!(window.turn_sizes().iter().sum::<usize>(), 6);
        assert_eq!(window.turn_count(), 3);
    }

    #[test]
    fn evicts_oldest_turn_past_window() {
        let mut window = ContextWindow::new(2);
        push_turn(&mut window, &[10, 11, 12]);
        push_turn(&mut window, &[20, 21]);
        push_turn(&mut window, &[30]);

        // First turn's three tokens are gone; the last two turns remain.
        assert_eq!(window.tokens(), &[20, 21, 30]);
        assert_eq!(window.turn_sizes(), &[2, 1]);
        assert_eq!(window.turn_count(), 2);
    }

    #[test]
    fn invariant_holds_over_many_turns() {
        let mut window = ContextWindow::new(5);
        for turn in 0..40u32 {
            let size = (turn % 7) as usize + 1;
            let appended: Vec<TokenId> = (0..size as TokenId).map(|i| turn * 100 + i).collect();
            push_turn(&mut window, &appended);
            assert!(window.turn_count() <= 5);
            assert_eq!(
                window.token_len(),
                window.turn_sizes().iter().sum::<usize>()
            );
        }
    }

    #[test]
    fn trim_is_noop_under_window() {
        let mut window = ContextWindow::new(3);
        push_turn(&mut window, &[1, 2]);
        let before: Vec<TokenId> = window.tokens().to_vec();
        window.trim();
        assert_eq!(window.tokens(), &before[..]);
        assert_eq!(window.turn_count(), 1);
    }

    #[test]
    fn zero_growth_turn_is_ledgered() {
        let mut window = ContextWindow::new(2);
        push_turn(&mut window, &[1, 2]);
        // A turn that somehow appended nothing still counts as a turn.
        window.append(window.tokens().to_vec());
        window.trim();
        assert_eq!(window.turn_count(), 2);
        assert_eq!(window.turn_sizes(), &[2, 0]);
    }

    #[test]
    fn clear_resets_state_but_keeps_window_size() {
        let mut window = ContextWindow::new(2);
        push_turn(&mut window, &[1, 2, 3]);
        push_turn(&mut window, &[4]);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.window_size(), 2);
        // Usable again after clearing.
        push_turn(&mut window, &[9]);
        assert_eq!(window.tokens(), &[9]);
    }
}
