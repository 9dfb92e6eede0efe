//! Candidate types for IME text conversion.
//!
//! Generalizes the teacher's flat `Candidate{text, score}` into the tagged
//! variants spec.md's translators emit (a plain dictionary hit versus a
//! shadowed duplicate versus an assembled sentence need different
//! provenance for filters downstream), while keeping `CandidateList`'s
//! pagination logic exactly as the teacher wrote it — paging through a
//! menu doesn't care what kind of candidate is in it.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// What produced a candidate; filters use this to decide how to treat it
/// (e.g. uniquification only dedups `Phrase`/`Sentence` text, not punctuation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateKind {
    /// A single dictionary entry for one segment.
    Simple,
    /// A duplicate of an earlier candidate, kept only to preserve paging.
    Shadow,
    /// A simple candidate whose text collided with another and was
    /// disambiguated (comment annotated with its code).
    Uniquified,
    /// A multi-character dictionary phrase.
    Phrase,
    /// An assembled multi-segment sentence.
    Sentence,
    /// Punctuation or symbol substitution, not looked up from a dictionary.
    PunctCandidate,
}

/// A single text candidate with an associated score and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub comment: String,
    pub preedit: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
    pub kind: CandidateKind,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, score: f32) -> Self {
        Candidate {
            text: text.into(),
            comment: String::new(),
            preedit: String::new(),
            score,
            start: 0,
            end: 0,
            kind: CandidateKind::Simple,
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_kind(mut self, kind: CandidateKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A paginated list of candidates with cursor navigation.
#[derive(Debug, Clone)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
    page_size: usize,
    current_page: usize,
    cursor: usize,
}

impl CandidateList {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            page_size: 5,
            current_page: 0,
            cursor: 0,
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
            cursor: 0,
        }
    }

    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            page_size: 5,
            current_page: 0,
            cursor: 0,
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        if self.current_page >= self.num_pages() && self.num_pages() > 0 {
            self.current_page = 0;
        }
        if self.cursor >= self.current_page_len() && self.current_page_len() > 0 {
            self.cursor = 0;
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.current_page = 0;
        self.cursor = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn num_pages(&self) -> usize {
        if self.candidates.is_empty() {
            0
        } else {
            self.candidates.len().div_ceil(self.page_size)
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn current_page_len(&self) -> usize {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.candidates.len());
        end.saturating_sub(start)
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.candidates.len());
        start..end
    }

    pub fn current_page_candidates(&self) -> &[Candidate] {
        if self.candidates.is_empty() {
            return &[];
        }
        &self.candidates[self.current_page_range()]
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.current_page_candidates().get(self.cursor)
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let global_index = self.current_page * self.page_size + self.cursor;
        (global_index < self.candidates.len()).then_some(global_index)
    }

    pub fn cursor_up(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn cursor_down(&mut self) -> bool {
        let page_len = self.current_page_len();
        if page_len > 0 && self.cursor < page_len - 1 {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            let page_len = self.current_page_len();
            if page_len > 0 && self.cursor >= page_len {
                self.cursor = page_len - 1;
            }
            true
        } else {
            false
        }
    }

    pub fn page_down(&mut self) -> bool {
        let num_pages = self.num_pages();
        if num_pages > 0 && self.current_page < num_pages - 1 {
            self.current_page += 1;
            let page_len = self.current_page_len();
            if page_len > 0 && self.cursor >= page_len {
                self.cursor = page_len - 1;
            }
            true
        } else {
            false
        }
    }

    pub fn select_by_index(&mut self, page_index: usize) -> Option<&Candidate> {
        if page_index < self.current_page_len() {
            self.cursor = page_index;
            self.selected_candidate()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.current_page = 0;
        self.cursor = 0;
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.cursor = 0;
    }

    /// Mark every candidate after the first occurrence of each distinct
    /// text as a `Shadow`, the way a uniquifying filter would before
    /// deciding whether to keep or drop them.
    pub fn mark_duplicates_as_shadow(&mut self) {
        let mut seen = std::collections::HashSet::new();
        for c in &mut self.candidates {
            if !seen.insert(c.text.clone()) {
                c.kind = CandidateKind::Shadow;
            }
        }
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_advances_and_wraps_cursor() {
        let mut list = CandidateList::with_page_size(2);
        list.set_candidates(vec![
            Candidate::new("a", 1.0),
            Candidate::new("b", 1.0),
            Candidate::new("c", 1.0),
        ]);
        assert_eq!(list.num_pages(), 2);
        assert!(list.page_down());
        assert_eq!(list.current_page_candidates().len(), 1);
        assert!(!list.page_down());
    }

    #[test]
    fn duplicate_text_marked_shadow() {
        let mut list = CandidateList::new();
        list.set_candidates(vec![
            Candidate::new("你好", 10.0).with_kind(CandidateKind::Phrase),
            Candidate::new("你好", 5.0).with_kind(CandidateKind::Phrase),
        ]);
        list.mark_duplicates_as_shadow();
        assert_eq!(list.candidates()[0].kind, CandidateKind::Phrase);
        assert_eq!(list.candidates()[1].kind, CandidateKind::Shadow);
    }
}
