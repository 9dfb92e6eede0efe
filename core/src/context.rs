//! Input context: raw keystrokes, the composition they produce, and the
//! notifiers platforms subscribe to for commit/selection/update events.
//!
//! Builds on the teacher's `ImeContext` data-transfer idea (plain public
//! fields the platform reads after each key) but adds the operation set and
//! notifier slots spec.md's Context component needs: push/pop/delete input,
//! caret movement, selection and confirmation of segments, schema-level
//! options/properties, and commit. Notifiers stay simple `Vec<Box<dyn
//! FnMut>>` registries rather than a full signal/slot crate, matching the
//! teacher's preference for minimal abstraction over this kind of
//! plumbing.

use crate::composition::Composition;
use std::collections::HashMap;

/// Input purpose hint for context-aware input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPurpose {
    #[default]
    FreeForm,
    Email,
    Url,
    Password,
    Number,
    Phone,
    Terminal,
}

/// Events a `Context` can report to subscribed notifiers.
#[derive(Debug, Clone)]
pub enum ContextEvent<'a> {
    Commit(&'a str),
    Select,
    Update,
    Delete,
    Abort,
    OptionUpdate(&'a str),
    PropertyUpdate(&'a str),
    UnhandledKey,
}

type Notifier = Box<dyn FnMut(&ContextEvent)>;

/// Raw input, its composition, and notification plumbing for one session.
pub struct Context {
    pub input: String,
    pub caret_pos: usize,
    pub composition: Composition,
    pub commit_text: String,
    pub input_purpose: InputPurpose,
    options: HashMap<String, bool>,
    properties: HashMap<String, String>,
    notifiers: Vec<Notifier>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            caret_pos: 0,
            composition: Composition::new(),
            commit_text: String::new(),
            input_purpose: InputPurpose::default(),
            options: HashMap::new(),
            properties: HashMap::new(),
            notifiers: Vec::new(),
        }
    }

    pub fn on_event<F: FnMut(&ContextEvent) + 'static>(&mut self, f: F) {
        self.notifiers.push(Box::new(f));
    }

    fn notify(&mut self, event: ContextEvent) {
        for n in &mut self.notifiers {
            n(&event);
        }
    }

    pub fn push_input(&mut self, ch: char) {
        self.input.insert(self.caret_pos, ch);
        self.caret_pos += ch.len_utf8();
        self.notify(ContextEvent::Update);
    }

    pub fn pop_input(&mut self) -> bool {
        if self.input.is_empty() {
            return false;
        }
        self.input.pop();
        self.caret_pos = self.caret_pos.min(self.input.len());
        self.notify(ContextEvent::Update);
        true
    }

    pub fn delete_input(&mut self) -> bool {
        if self.caret_pos >= self.input.len() {
            return false;
        }
        let next = self.input[self.caret_pos..]
            .chars()
            .next()
            .map(|c| self.caret_pos + c.len_utf8())
            .unwrap_or(self.input.len());
        self.input.replace_range(self.caret_pos..next, "");
        self.notify(ContextEvent::Delete);
        true
    }

    pub fn set_caret_pos(&mut self, pos: usize) {
        self.caret_pos = pos.min(self.input.len());
    }

    pub fn select(&mut self, segment_index: usize, candidate_index: usize) {
        if let Some(seg) = self.composition.segments.get_mut(segment_index) {
            seg.select(candidate_index);
            self.notify(ContextEvent::Select);
        }
    }

    pub fn highlight(&mut self, segment_index: usize, candidate_index: usize) {
        if let Some(seg) = self.composition.segments.get_mut(segment_index) {
            seg.selected_index = Some(candidate_index);
        }
    }

    pub fn confirm_current_selection(&mut self) {
        if let Some(seg) = self.composition.last_open_segment_mut() {
            seg.confirm();
            self.notify(ContextEvent::Update);
        }
    }

    pub fn reopen_previous_segment(&mut self) {
        if let Some(seg) = self
            .composition
            .segments
            .iter_mut()
            .rev()
            .find(|s| s.confirmed())
        {
            seg.reopen();
            self.notify(ContextEvent::Update);
        }
    }

    pub fn commit(&mut self) -> String {
        let text = std::mem::take(&mut self.composition.preedit);
        self.commit_text = text.clone();
        self.clear();
        self.notify(ContextEvent::Commit(&self.commit_text.clone()));
        text
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.caret_pos = 0;
        self.composition.clear();
    }

    pub fn abort(&mut self) {
        self.clear();
        self.notify(ContextEvent::Abort);
    }

    pub fn set_option(&mut self, name: &str, value: bool) {
        self.options.insert(name.to_string(), value);
        self.notify(ContextEvent::OptionUpdate(name));
    }

    pub fn get_option(&self, name: &str) -> bool {
        self.options.get(name).copied().unwrap_or(false)
    }

    pub fn set_property(&mut self, name: &str, value: String) {
        self.properties.insert(name.to_string(), value);
        self.notify(ContextEvent::PropertyUpdate(name));
    }

    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|s| s.as_str())
    }

    pub fn report_unhandled_key(&mut self) {
        self.notify(ContextEvent::UnhandledKey);
    }

    pub fn is_composing(&self) -> bool {
        !self.input.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn push_and_pop_input_round_trips() {
        let mut ctx = Context::new();
        ctx.push_input('n');
        ctx.push_input('i');
        assert_eq!(ctx.input, "ni");
        assert!(ctx.pop_input());
        assert_eq!(ctx.input, "n");
    }

    #[test]
    fn commit_notifies_and_clears() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = Context::new();
        let events_clone = events.clone();
        ctx.on_event(move |e| {
            if let ContextEvent::Commit(text) = e {
                events_clone.borrow_mut().push(text.to_string());
            }
        });
        ctx.composition.set_text("你好".to_string());
        let committed = ctx.commit();
        assert_eq!(committed, "你好");
        assert!(ctx.composition.is_empty());
        assert_eq!(events.borrow().as_slice(), ["你好".to_string()]);
    }

    #[test]
    fn options_and_properties_round_trip() {
        let mut ctx = Context::new();
        ctx.set_option("ascii_mode", true);
        assert!(ctx.get_option("ascii_mode"));
        ctx.set_property("schema_id", "pinyin_simp".to_string());
        assert_eq!(ctx.get_property("schema_id"), Some("pinyin_simp"));
    }
}
