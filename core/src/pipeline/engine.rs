//! Engine: owns a `Context` and drives it through
//! processor → segmentor → translator → filter on every key.
//!
//! Grounded in the teacher's `ImeEngine` (`ime_engine.rs`): a single struct
//! wrapping the backend resources plus a `process_key` entry point and a
//! `context()` accessor the host reads after each call.

use crate::candidate::CandidateList;
use crate::context::Context;
use crate::dictionary::Dictionary;
use crate::pipeline::filter::{Filter, RankFilter, UniquifyFilter};
use crate::pipeline::processor::{KeyEvent, ProcessResult, Processor};
use crate::pipeline::segmentor::Segmentor;
use crate::pipeline::translator::Translator;
use crate::prism::Prism;
use crate::syllabifier::Syllabifier;
use crate::table::Table;
use crate::user_dictionary::UserDictionary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKeyResult {
    Handled,
    NotHandled,
}

pub struct Engine<'a> {
    processor: Processor,
    prism: &'a Prism,
    delimiters: &'a [char],
    table: &'a Table,
    user_dict: Option<&'a UserDictionary>,
    context: Context,
    menu: CandidateList,
}

impl<'a> Engine<'a> {
    pub fn new(prism: &'a Prism, delimiters: &'a [char], table: &'a Table, user_dict: Option<&'a UserDictionary>) -> Self {
        Self {
            processor: Processor::new(),
            prism,
            delimiters,
            table,
            user_dict,
            context: Context::new(),
            menu: CandidateList::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn menu(&self) -> &CandidateList {
        &self.menu
    }

    /// Recompute the composition and candidate menu from the current
    /// input (segment, translate, filter); called after any key that
    /// changes the raw input.
    pub fn recompose(&mut self) {
        if self.context.input.is_empty() {
            self.context.composition.clear();
            self.menu.clear();
            return;
        }
        let segmentor = Segmentor::new(Syllabifier::new(self.prism, self.delimiters));
        let (graph, composition) = segmentor.segment(&self.context.input);
        self.context.composition = composition;

        let dictionary = Dictionary::new(self.table, self.user_dict);
        let translator = Translator::new(dictionary);
        let candidates = translator.translate(&graph, 0);

        let candidates = UniquifyFilter.apply(candidates);
        let candidates = RankFilter.apply(candidates);
        self.menu.set_candidates(candidates);
    }

    pub fn process_key(&mut self, event: KeyEvent) -> EngineKeyResult {
        match event {
            KeyEvent::Up => {
                self.menu.cursor_up();
                return EngineKeyResult::Handled;
            }
            KeyEvent::Down => {
                self.menu.cursor_down();
                return EngineKeyResult::Handled;
            }
            KeyEvent::PageUp => {
                self.menu.page_up();
                return EngineKeyResult::Handled;
            }
            KeyEvent::PageDown => {
                self.menu.page_down();
                return EngineKeyResult::Handled;
            }
            KeyEvent::Number(n) => {
                if self.select_candidate((n as usize).saturating_sub(1)) {
                    return EngineKeyResult::Handled;
                }
                return EngineKeyResult::NotHandled;
            }
            KeyEvent::Space => {
                if self.select_candidate(self.menu.cursor()) {
                    return EngineKeyResult::Handled;
                }
            }
            _ => {}
        }

        match self.processor.process(&mut self.context, event) {
            ProcessResult::Accepted => {
                self.recompose();
                EngineKeyResult::Handled
            }
            ProcessResult::Noop => EngineKeyResult::Handled,
            ProcessResult::Rejected => EngineKeyResult::NotHandled,
        }
    }

    fn select_candidate(&mut self, page_index: usize) -> bool {
        let Some(candidate) = self.menu.select_by_index(page_index).cloned() else {
            return false;
        };
        self.context.composition.set_text(candidate.text.clone());
        self.context.commit();
        self.menu.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, DictEntry, SpellingType};
    use crate::prism::{Prism, SpellingDescriptor};
    use std::collections::BTreeMap;

    fn sample_prism() -> Prism {
        let mut m = BTreeMap::new();
        m.insert(
            "ni".to_string(),
            vec![SpellingDescriptor {
                syllable_id: 1,
                spelling_type: SpellingType::Normal,
                credibility: 0.0,
                tips: None,
            }],
        );
        Prism::build(m, 0, 0).unwrap()
    }

    fn sample_table() -> Table {
        let mut m = BTreeMap::new();
        m.insert(Code(vec![1]), vec![DictEntry::new("你", Code(vec![1]), 10.0)]);
        Table::build(m, 0, 0)
    }

    #[test]
    fn typing_and_selecting_commits_text() {
        let prism = sample_prism();
        let table = sample_table();
        let mut engine = Engine::new(&prism, &[], &table, None);
        engine.process_key(KeyEvent::Char('n'));
        engine.process_key(KeyEvent::Char('i'));
        assert_eq!(engine.menu().candidates()[0].text, "你");
        engine.process_key(KeyEvent::Number(1));
        assert_eq!(engine.context().commit_text, "你");
    }
}
