//! Key binder: declarative `{when, action}` rules resolving a raw key
//! event to an engine action before the pipeline's own processor sees it.
//!
//! Grounded in the teacher's `ImeEngine::process_key` dispatch
//! (`ime_engine.rs`), which hardcoded a handful of global shortcuts ahead
//! of mode routing; generalized into a declarative binding table so
//! schemas can add/override bindings without a code change, the way
//! librime's `key_binder` processor works.

use crate::pipeline::processor::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum When {
    Paging,
    HasMenu,
    Composing,
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingAction {
    Send(KeyEvent),
    Toggle(String),
    SetOption(String),
    UnsetOption(String),
    Select(usize),
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyEvent,
    pub when: When,
    pub action: BindingAction,
}

/// Runtime flags a binding's `when` clause is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingContext {
    pub composing: bool,
    pub has_menu: bool,
    pub paging: bool,
}

impl BindingContext {
    fn satisfies(&self, when: When) -> bool {
        match when {
            When::Always => true,
            When::Composing => self.composing,
            When::HasMenu => self.has_menu,
            When::Paging => self.paging,
        }
    }
}

pub struct KeyBinder {
    bindings: Vec<KeyBinding>,
}

impl KeyBinder {
    pub fn new(mut bindings: Vec<KeyBinding>) -> Self {
        // Stricter `when` clauses take precedence: paging < has_menu <
        // composing < always, sorted ascending so the strictest binding
        // for a key is tried first.
        bindings.sort_by_key(|b| b.when);
        Self { bindings }
    }

    /// Resolve `key` to the strictest matching binding whose `when`
    /// clause is satisfied by `ctx`, or `None` if nothing binds it.
    pub fn resolve(&self, key: KeyEvent, ctx: BindingContext) -> Option<&BindingAction> {
        self.bindings
            .iter()
            .filter(|b| b.key == key)
            .find(|b| ctx.satisfies(b.when))
            .map(|b| &b.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stricter_binding_wins_when_both_conditions_hold() {
        let binder = KeyBinder::new(vec![
            KeyBinding {
                key: KeyEvent::Escape,
                when: When::Always,
                action: BindingAction::Send(KeyEvent::Escape),
            },
            KeyBinding {
                key: KeyEvent::Escape,
                when: When::Paging,
                action: BindingAction::Toggle("page_cancel".into()),
            },
        ]);
        let ctx = BindingContext {
            composing: true,
            has_menu: true,
            paging: true,
        };
        assert_eq!(
            binder.resolve(KeyEvent::Escape, ctx),
            Some(&BindingAction::Toggle("page_cancel".into()))
        );
    }

    #[test]
    fn falls_back_to_looser_binding_when_stricter_unmet() {
        let binder = KeyBinder::new(vec![
            KeyBinding {
                key: KeyEvent::Escape,
                when: When::Always,
                action: BindingAction::Send(KeyEvent::Escape),
            },
            KeyBinding {
                key: KeyEvent::Escape,
                when: When::Paging,
                action: BindingAction::Toggle("page_cancel".into()),
            },
        ]);
        let ctx = BindingContext::default();
        assert_eq!(
            binder.resolve(KeyEvent::Escape, ctx),
            Some(&BindingAction::Send(KeyEvent::Escape))
        );
    }

    #[test]
    fn unbound_key_resolves_to_none() {
        let binder = KeyBinder::new(vec![]);
        assert_eq!(binder.resolve(KeyEvent::Char('a'), BindingContext::default()), None);
    }
}
