//! Core data model: syllables, spellings, codes, and dictionary entries.
//!
//! Grounded in the teacher's `single_gram::SingleGram` (sorted, deduplicated
//! token/frequency pairs with explicit merge semantics) for the ordering and
//! storage conventions used by [`Code`] and [`DictEntry`], and in
//! `candidate::Candidate` for the score-first, text-second comparison idiom.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Dense, non-negative identifier for an interned syllable.
pub type SyllableId = u32;

/// How a spelling relates to its canonical syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellingType {
    Normal,
    Abbrev,
    Completion,
    Fuzzy,
    Ambiguous,
    Correction,
    Invalid,
}

impl SpellingType {
    /// Dominance order: lower is "better" (spec §3 invariant 2, §4.G step 5).
    fn rank(self) -> u8 {
        match self {
            SpellingType::Normal => 0,
            SpellingType::Abbrev => 1,
            SpellingType::Ambiguous => 2,
            SpellingType::Fuzzy => 3,
            SpellingType::Correction => 4,
            SpellingType::Completion => 5,
            SpellingType::Invalid => 6,
        }
    }

    /// The worse (higher-ranked) of two types, used when an edge raises a
    /// vertex's type during syllabification.
    pub fn worse(self, other: SpellingType) -> SpellingType {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }
}

impl PartialOrd for SpellingType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpellingType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Per-spelling metadata attached to a Prism entry or a syllable-graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellingProperties {
    pub syllable_id: SyllableId,
    pub spelling_type: SpellingType,
    pub end_pos: usize,
    /// Log-probability, always `<= 0.0`.
    pub credibility: f64,
    pub tips: Option<String>,
}

impl SpellingProperties {
    pub fn normal(syllable_id: SyllableId, end_pos: usize) -> Self {
        Self {
            syllable_id,
            spelling_type: SpellingType::Normal,
            end_pos,
            credibility: 0.0,
            tips: None,
        }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.credibility -= penalty.abs();
        self
    }

    pub fn with_type(mut self, spelling_type: SpellingType) -> Self {
        self.spelling_type = spelling_type;
        self
    }
}

/// An ordered sequence of syllable ids: the linguistic key of a phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Code(pub Vec<SyllableId>);

impl Code {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &[SyllableId]) -> bool {
        self.0.starts_with(prefix)
    }
}

/// Same as [`Code`] but holding raw spelling strings; used only during
/// compilation, before syllables are interned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCode(pub Vec<String>);

/// A compiled phrase-dictionary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictEntry {
    pub text: String,
    pub comment: String,
    pub preedit: String,
    pub code: Code,
    /// Log-probability weight.
    pub weight: f64,
    pub commit_count: i32,
    pub matching_code_size: usize,
}

impl DictEntry {
    pub fn new(text: impl Into<String>, code: Code, weight: f64) -> Self {
        Self {
            text: text.into(),
            comment: String::new(),
            preedit: String::new(),
            code,
            weight,
            commit_count: 0,
            matching_code_size: 0,
        }
    }
}

impl PartialEq for DictEntry {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.code == other.code && self.weight == other.weight
    }
}
impl Eq for DictEntry {}

impl PartialOrd for DictEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Descending weight; ties break by ascending code length, then lexicographic text.
impl Ord for DictEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .partial_cmp(&self.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.code.len().cmp(&other.code.len()))
            .then_with(|| self.text.cmp(&other.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_entry_orders_by_weight_then_code_len_then_text() {
        let mut v = vec![
            DictEntry::new("b", Code(vec![1, 2]), 1.0),
            DictEntry::new("a", Code(vec![1]), 1.0),
            DictEntry::new("c", Code(vec![1]), 2.0),
        ];
        v.sort();
        assert_eq!(v[0].text, "c"); // highest weight first
        assert_eq!(v[1].text, "a"); // tie on weight, shorter code first
        assert_eq!(v[2].text, "b");
    }

    #[test]
    fn spelling_type_dominance() {
        assert_eq!(SpellingType::Normal.worse(SpellingType::Fuzzy), SpellingType::Fuzzy);
        assert_eq!(SpellingType::Completion.worse(SpellingType::Normal), SpellingType::Completion);
    }
}
