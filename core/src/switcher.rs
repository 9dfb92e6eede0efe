//! Switcher: a hot-key-activated meta-engine presenting schemas and
//! runtime options as ordinary candidates, letting the same selection UI
//! used for text candidates double as a settings menu.

use crate::candidate::{Candidate, CandidateKind, CandidateList};

#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub schema_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct OptionInfo {
    pub name: String,
    pub label_on: String,
    pub label_off: String,
    pub enabled: bool,
}

pub struct Switcher {
    pub active: bool,
    schemas: Vec<SchemaInfo>,
    options: Vec<OptionInfo>,
}

impl Switcher {
    pub fn new(schemas: Vec<SchemaInfo>, options: Vec<OptionInfo>) -> Self {
        Self {
            active: false,
            schemas,
            options,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Build the switcher's own menu: one candidate per schema, followed
    /// by one candidate per toggleable option.
    pub fn menu(&self) -> CandidateList {
        let mut candidates = Vec::new();
        for schema in &self.schemas {
            candidates.push(
                Candidate::new(schema.name.clone(), 0.0)
                    .with_comment(schema.schema_id.clone())
                    .with_kind(CandidateKind::Simple),
            );
        }
        for opt in &self.options {
            let label = if opt.enabled { &opt.label_on } else { &opt.label_off };
            candidates.push(
                Candidate::new(label.clone(), 0.0)
                    .with_comment(opt.name.clone())
                    .with_kind(CandidateKind::Simple),
            );
        }
        CandidateList::from_candidates(candidates)
    }

    /// Resolve a selection back to either a schema switch or an option
    /// toggle, by index into the menu `menu()` produced.
    pub fn select(&mut self, index: usize) -> SwitcherAction {
        if index < self.schemas.len() {
            SwitcherAction::SwitchSchema(self.schemas[index].schema_id.clone())
        } else if let Some(opt) = self.options.get_mut(index - self.schemas.len()) {
            opt.enabled = !opt.enabled;
            SwitcherAction::ToggleOption(opt.name.clone(), opt.enabled)
        } else {
            SwitcherAction::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitcherAction {
    SwitchSchema(String),
    ToggleOption(String, bool),
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_schema_entry_returns_switch_action() {
        let switcher = Switcher::new(
            vec![SchemaInfo {
                schema_id: "pinyin_simp".into(),
                name: "Pinyin Simplified".into(),
            }],
            vec![],
        );
        let mut switcher = switcher;
        assert_eq!(
            switcher.select(0),
            SwitcherAction::SwitchSchema("pinyin_simp".to_string())
        );
    }

    #[test]
    fn selecting_an_option_entry_toggles_it() {
        let mut switcher = Switcher::new(
            vec![],
            vec![OptionInfo {
                name: "ascii_mode".into(),
                label_on: "中".into(),
                label_off: "A".into(),
                enabled: false,
            }],
        );
        let action = switcher.select(0);
        assert_eq!(action, SwitcherAction::ToggleOption("ascii_mode".to_string(), true));
    }
}
