//! Per-session conversation log
//!
//! `ConversationStore` is append-only: turns are never edited or removed once
//! recorded. It lives exactly as long as the session that owns it.
//! `ConversationWindow` is the bounded, chronological view of prior turns that
//! the model receives as context.

use crate::turn::Turn;

/// Position of a turn in its store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TurnId(usize);

impl TurnId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) -> TurnId {
        self.turns.push(turn);
        TurnId(self.turns.len() - 1)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.get(id.0)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The turns recorded before `id`, at most `bound` of them (all when `None`),
    /// oldest first. The turn at `id` itself is never included.
    pub fn window_before(&self, id: TurnId, bound: Option<usize>) -> ConversationWindow<'_> {
        let end = id.0.min(self.turns.len());
        let start = match bound {
            Some(bound) => end.saturating_sub(bound),
            None => 0,
        };
        ConversationWindow {
            turns: &self.turns[start..end],
        }
    }
}

/// Read-only view of prior turns handed to the model
#[derive(Debug, Clone, Copy)]
pub struct ConversationWindow<'a> {
    turns: &'a [Turn],
}

impl<'a> ConversationWindow<'a> {
    pub fn empty() -> Self {
        Self { turns: &[] }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Turn> + 'a {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// One `"<Role>: <content>"` line per turn, in order.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}\n", turn.role(), turn.content()))
            .collect()
    }
}
