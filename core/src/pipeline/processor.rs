//! Processor: turns raw key events into `Context` mutations.
//!
//! Grounded in the teacher's `KeyEvent`/`KeyResult` enums (`ime_engine.rs`),
//! generalized to the three-way `ProcessResult` spec.md calls for —
//! `Rejected` (not ours, pass through) is distinct from `Noop` (ours, but
//! nothing changed, e.g. backspace on empty input).

use crate::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Space,
    Enter,
    Escape,
    Number(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// The key was consumed and changed IME state.
    Accepted,
    /// The key is not meaningful to the IME; the host should handle it.
    Rejected,
    /// The key was ours to interpret but had no effect.
    Noop,
}

/// Interprets raw key events against a `Context`. Candidate selection
/// (`Number`, `Space`, `Up`/`Down`) is left to the caller, which owns the
/// current `CandidateList` the processor doesn't have visibility into;
/// this stage only owns input-buffer editing and composing state.
pub struct Processor;

impl Processor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `event` to `ctx`. Returns `Rejected` for events this stage
    /// never handles itself (selection keys), leaving them for the caller.
    pub fn process(&self, ctx: &mut Context, event: KeyEvent) -> ProcessResult {
        match event {
            KeyEvent::Char(c) if c.is_ascii_alphabetic() || c == '\'' => {
                ctx.push_input(c);
                ProcessResult::Accepted
            }
            KeyEvent::Char(_) => ProcessResult::Rejected,
            KeyEvent::Backspace => {
                if ctx.pop_input() {
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Delete => {
                if ctx.delete_input() {
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Left => {
                if ctx.caret_pos > 0 {
                    ctx.set_caret_pos(ctx.caret_pos - 1);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Right => {
                if ctx.caret_pos < ctx.input.len() {
                    ctx.set_caret_pos(ctx.caret_pos + 1);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Escape => {
                if ctx.is_composing() {
                    ctx.abort();
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Enter => {
                if ctx.is_composing() {
                    ctx.commit();
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Rejected
                }
            }
            // Selection navigation and digit selection require the active
            // CandidateList, which lives in the Engine, not the Context.
            KeyEvent::Up
            | KeyEvent::Down
            | KeyEvent::PageUp
            | KeyEvent::PageDown
            | KeyEvent::Space
            | KeyEvent::Number(_) => {
                if ctx.is_composing() {
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Rejected
                }
            }
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_input_is_accepted_when_composing() {
        let mut ctx = Context::new();
        let p = Processor::new();
        assert_eq!(p.process(&mut ctx, KeyEvent::Char('n')), ProcessResult::Accepted);
        assert_eq!(ctx.input, "n");
    }

    #[test]
    fn backspace_on_empty_input_is_noop() {
        let mut ctx = Context::new();
        let p = Processor::new();
        assert_eq!(p.process(&mut ctx, KeyEvent::Backspace), ProcessResult::Noop);
    }

    #[test]
    fn enter_without_composing_is_rejected() {
        let mut ctx = Context::new();
        let p = Processor::new();
        assert_eq!(p.process(&mut ctx, KeyEvent::Enter), ProcessResult::Rejected);
    }
}
