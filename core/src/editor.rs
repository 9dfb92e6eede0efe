//! Editor: binds named actions to key events and decides, for a plain
//! character, whether it should be appended to the composing input or
//! committed straight through.
//!
//! Grounded in the teacher's `Editor` trait and `PhoneticEditor`
//! (pre-transform `editor.rs`): kept the idea of a small enum of named
//! actions dispatched per key, dropped the per-mode struct hierarchy
//! (`PhoneticEditor`/`PunctuationEditor`/`SuggestionEditor`) in favor of one
//! declarative `EditorBindings` table the way the key binder expects
//! actions to be data, not code.

use crate::pipeline::processor::KeyEvent;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Confirm,
    Revert,
    Back,
    BackSyllable,
    DeleteChar,
    DeleteCandidate,
    Cancel,
    CommitRaw,
    CommitComposed,
}

/// Decides whether a plain character is appended to the input (composing)
/// or committed immediately, the way a punctuation schema commits
/// character by character rather than composing a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharHandling {
    AddToInput,
    DirectCommit,
}

pub struct EditorBindings {
    actions: HashMap<KeyEvent, EditorAction>,
    char_handling: CharHandling,
}

impl EditorBindings {
    pub fn new(char_handling: CharHandling) -> Self {
        Self {
            actions: HashMap::new(),
            char_handling,
        }
    }

    /// The phonetic schema's default bindings: enter confirms, escape
    /// cancels, backspace steps back one character.
    pub fn phonetic_defaults() -> Self {
        let mut bindings = Self::new(CharHandling::AddToInput);
        bindings.bind(KeyEvent::Enter, EditorAction::Confirm);
        bindings.bind(KeyEvent::Escape, EditorAction::Cancel);
        bindings.bind(KeyEvent::Backspace, EditorAction::DeleteChar);
        bindings
    }

    pub fn bind(&mut self, key: KeyEvent, action: EditorAction) {
        self.actions.insert(key, action);
    }

    pub fn action_for(&self, key: KeyEvent) -> Option<&EditorAction> {
        self.actions.get(&key)
    }

    pub fn char_handling(&self) -> CharHandling {
        self.char_handling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phonetic_defaults_bind_enter_to_confirm() {
        let bindings = EditorBindings::phonetic_defaults();
        assert_eq!(bindings.action_for(KeyEvent::Enter), Some(&EditorAction::Confirm));
        assert_eq!(bindings.action_for(KeyEvent::Char('a')), None);
    }

    #[test]
    fn custom_binding_overrides_action() {
        let mut bindings = EditorBindings::phonetic_defaults();
        bindings.bind(KeyEvent::Enter, EditorAction::CommitRaw);
        assert_eq!(bindings.action_for(KeyEvent::Enter), Some(&EditorAction::CommitRaw));
    }
}
