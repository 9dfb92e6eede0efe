//! Encoders turn a phrase with no explicit code into a [`RawCode`],
//! grounded in `calculus.cc`'s sibling file `table_encoder.cc`/
//! `script_encoder`: the collector hands a phrase to whichever encoder the
//! schema selected, and gets back zero or more `(code, weight)` pairs to
//! record.

use crate::entry_collector::EntryCollector;
use ime_core::{CoreError, CoreResult, RawCode};

pub trait Encoder {
    fn encode_phrase(
        &self,
        collector: &EntryCollector,
        phrase: &str,
        weight_str: &str,
    ) -> CoreResult<Vec<(RawCode, f64)>>;
}

/// Picks, for each character, its highest-weight known single-character
/// code and concatenates them — the common-case segmentation. Full
/// exhaustive multi-segmentation (every way to cut the phrase into known
/// sub-words) is out of scope here; see DESIGN.md.
pub struct ScriptEncoder;

impl ScriptEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScriptEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for ScriptEncoder {
    fn encode_phrase(
        &self,
        collector: &EntryCollector,
        phrase: &str,
        weight_str: &str,
    ) -> CoreResult<Vec<(RawCode, f64)>> {
        let mut syllables = Vec::new();
        for ch in phrase.chars() {
            let key = ch.to_string();
            let best = best_code_for(collector, &key)
                .ok_or_else(|| CoreError::Encoding(format!("no known code for character '{key}'")))?;
            syllables.extend(best);
        }
        let weight = weight_str.parse().unwrap_or(0.0);
        Ok(vec![(RawCode(syllables), weight)])
    }
}

fn best_code_for(collector: &EntryCollector, ch: &str) -> Option<Vec<String>> {
    let by_code = collector.words.get(ch)?;
    let (code_str, _) = by_code.iter().max_by(|a, b| a.1.partial_cmp(b.1).unwrap())?;
    Some(code_str.split_whitespace().map(str::to_string).collect())
}

#[derive(Debug, Clone)]
pub enum LengthWindow {
    Equal(usize),
    Range(usize, usize),
}

impl LengthWindow {
    fn matches(&self, len: usize) -> bool {
        match self {
            LengthWindow::Equal(n) => len == *n,
            LengthWindow::Range(lo, hi) => len >= *lo && len <= *hi,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncodingRule {
    pub window: LengthWindow,
    pub formula: String,
}

/// Formula-driven encoder: each rule names a length window and a formula
/// of 2-char coordinate specifiers `Cc` (`C` indexes a character, `c`
/// indexes that character's code position), per the calculus-derived
/// coordinate scheme `A..U`/`a..u` = 0-indexed from the start, `V..Z`/
/// `v..z` = -5..-1 from the end.
pub struct TableEncoder {
    pub rules: Vec<EncodingRule>,
}

impl TableEncoder {
    pub fn new(rules: Vec<EncodingRule>) -> Self {
        Self { rules }
    }

    /// Resolve one coordinate specifier against `len`, returning the
    /// index and whether the specifier counted from the start (`true`,
    /// `A..U`/`a..u`) or from the end (`false`, `V..Z`/`v..z`).
    fn coord(spec: char, start: char, from_end: char, len: usize) -> Option<(usize, bool)> {
        if spec >= start && spec < from_end {
            let idx = (spec as u8 - start as u8) as usize;
            (idx < len).then_some((idx, true))
        } else if spec >= from_end && spec <= ((from_end as u8) + 4) as char {
            let offset = (spec as u8 - from_end as u8) as isize - 5;
            let idx = len as isize + offset;
            (idx >= 0 && (idx as usize) < len).then_some((idx as usize, false))
        } else {
            None
        }
    }

    fn char_coord(spec: char, len: usize) -> Option<(usize, bool)> {
        Self::coord(spec, 'A', 'V', len)
    }

    fn code_coord(spec: char, len: usize) -> Option<(usize, bool)> {
        Self::coord(spec, 'a', 'v', len)
    }
}

impl Encoder for TableEncoder {
    fn encode_phrase(
        &self,
        collector: &EntryCollector,
        phrase: &str,
        weight_str: &str,
    ) -> CoreResult<Vec<(RawCode, f64)>> {
        let chars: Vec<String> = phrase.chars().map(|c| c.to_string()).collect();
        let rule = self
            .rules
            .iter()
            .find(|r| r.window.matches(chars.len()))
            .ok_or_else(|| CoreError::Encoding(format!("no encoding rule matches length {}", chars.len())))?;

        let mut seen = std::collections::HashSet::new();
        let mut syllables = Vec::new();
        let mut coords = rule.formula.chars();
        while let (Some(c_spec), Some(s_spec)) = (coords.next(), coords.next()) {
            let Some((char_idx, char_from_start)) = Self::char_coord(c_spec, chars.len()) else {
                continue;
            };
            let Some(syllable_set) = best_code_for(collector, &chars[char_idx]) else {
                continue;
            };
            let Some((syl_idx, syl_from_start)) = Self::code_coord(s_spec, syllable_set.len()) else {
                continue;
            };
            let key = (char_idx, syl_idx);
            if !seen.insert(key) && !(char_from_start && syl_from_start) {
                continue;
            }
            syllables.push(syllable_set[syl_idx].clone());
        }

        if syllables.is_empty() {
            return Err(CoreError::Encoding(format!("formula produced no syllables for '{phrase}'")));
        }
        let weight = weight_str.parse().unwrap_or(0.0);
        Ok(vec![(RawCode(syllables), weight)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn collector_with(pairs: &[(&str, &str, f64)]) -> EntryCollector {
        let mut collector = EntryCollector::new();
        for (ch, code, weight) in pairs {
            collector
                .words
                .entry(ch.to_string())
                .or_default()
                .insert(code.to_string(), *weight);
        }
        collector
    }

    #[test]
    fn script_encoder_concatenates_best_per_character_codes() {
        let collector = collector_with(&[("你", "ni", 10.0), ("好", "hao", 8.0)]);
        let encoder = ScriptEncoder::new();
        let (code, _) = &encoder.encode_phrase(&collector, "你好", "5").unwrap()[0];
        assert_eq!(code.0, vec!["ni".to_string(), "hao".to_string()]);
    }

    #[test]
    fn script_encoder_fails_on_unknown_character() {
        let collector = EntryCollector::new();
        let encoder = ScriptEncoder::new();
        assert!(encoder.encode_phrase(&collector, "你", "1").is_err());
    }

    #[test]
    fn table_encoder_picks_first_matching_rule() {
        let collector = collector_with(&[("你", "ni", 10.0), ("好", "hao", 8.0)]);
        let encoder = TableEncoder::new(vec![EncodingRule {
            window: LengthWindow::Equal(2),
            formula: "AaBa".to_string(),
        }]);
        let (code, _) = &encoder.encode_phrase(&collector, "你好", "5").unwrap()[0];
        assert_eq!(code.0, vec!["ni".to_string(), "hao".to_string()]);
    }

    #[test]
    fn table_encoder_errors_when_no_rule_matches() {
        let collector = collector_with(&[("你", "ni", 10.0)]);
        let encoder = TableEncoder::new(vec![EncodingRule {
            window: LengthWindow::Equal(3),
            formula: "Aa".to_string(),
        }]);
        assert!(encoder.encode_phrase(&collector, "你", "1").is_err());
    }
}
