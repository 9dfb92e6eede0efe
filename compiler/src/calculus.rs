//! Spelling algebra: the small DSL a schema's `speller/algebra` list uses to
//! expand or prune spellings before they go into the Prism.
//!
//! Grounded directly in `calculus.cc`'s `Calculus`/`Transliteration`/
//! `Transformation`/`Erasion`/`Derivation`/`Fuzzing`/`Abbreviation` classes.
//! The C++ side parses a definition by scanning for the first character
//! that isn't a lowercase ASCII letter and using it as the field separator
//! for the rest of the line (so `xlit/ABC/abc/` and `xlit|ABC|abc|` both
//! work); that separator-sniffing is kept here rather than hardcoding `/`.

use ime_core::model::SpellingType;
use regex::Regex;
use std::collections::HashMap;

pub const ABBREVIATION_PENALTY: f64 = -0.693_147_180_559_945_3; // ln(0.5)
pub const FUZZY_SPELLING_PENALTY: f64 = -0.693_147_180_559_945_3; // ln(0.5)

/// A spelling string plus the properties a calculation may mutate in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcSpelling {
    pub text: String,
    pub spelling_type: SpellingType,
    pub credibility: f64,
}

impl CalcSpelling {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spelling_type: SpellingType::Normal,
            credibility: 0.0,
        }
    }
}

pub trait Calculation {
    /// Mutate `spelling` in place, returning whether it changed. A
    /// calculation that clears `spelling.text` signals the spelling should
    /// be dropped entirely (erasion).
    fn apply(&self, spelling: &mut CalcSpelling) -> bool;

    /// Whether this calculation removes a spelling outright (only
    /// `Erasion`). Deletion and addition are mutually exclusive.
    fn deletion(&self) -> bool {
        false
    }

    /// Whether this calculation keeps the original spelling and emits an
    /// additional one (`derive`/`fuzz`/`abbrev`) rather than transforming
    /// the spelling in place (`xlit`/`xform`).
    fn addition(&self) -> bool {
        false
    }
}

/// Runs one calculation over a whole spelling set, honoring the
/// addition/deletion semantics spec.md §9 calls out: `xlit`/`xform` replace
/// a spelling in place, `erase` drops matching spellings, and
/// `derive`/`fuzz`/`abbrev` keep the original alongside a newly derived one.
pub fn apply_rule(spellings: Vec<CalcSpelling>, rule: &dyn Calculation) -> Vec<CalcSpelling> {
    let mut out = Vec::with_capacity(spellings.len());
    for spelling in spellings {
        if rule.addition() {
            let mut derived = spelling.clone();
            if rule.apply(&mut derived) {
                out.push(spelling);
                out.push(derived);
            } else {
                out.push(spelling);
            }
        } else if rule.deletion() {
            let mut candidate = spelling.clone();
            if rule.apply(&mut candidate) && candidate.text.is_empty() {
                continue;
            }
            out.push(spelling);
        } else {
            let mut mutated = spelling;
            rule.apply(&mut mutated);
            out.push(mutated);
        }
    }
    out
}

pub struct Transliteration {
    char_map: HashMap<char, char>,
}

impl Transliteration {
    fn parse(args: &[&str]) -> Option<Self> {
        let (left, right) = (args.get(1)?, args.get(2)?);
        let char_map: HashMap<char, char> = left.chars().zip(right.chars()).collect();
        if left.chars().count() != right.chars().count() || char_map.is_empty() {
            return None;
        }
        Some(Self { char_map })
    }
}

impl Calculation for Transliteration {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        if spelling.text.is_empty() {
            return false;
        }
        let mut modified = false;
        let result: String = spelling
            .text
            .chars()
            .map(|c| match self.char_map.get(&c) {
                Some(mapped) => {
                    modified = true;
                    *mapped
                }
                None => c,
            })
            .collect();
        if modified {
            spelling.text = result;
        }
        modified
    }
}

pub struct Transformation {
    pattern: Regex,
    replacement: String,
}

impl Transformation {
    fn parse(args: &[&str]) -> Option<Self> {
        let (left, right) = (args.get(1)?, args.get(2)?);
        if left.is_empty() {
            return None;
        }
        let pattern = Regex::new(left).ok()?;
        Some(Self {
            pattern,
            replacement: right.to_string(),
        })
    }
}

impl Calculation for Transformation {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        if spelling.text.is_empty() {
            return false;
        }
        let result = self.pattern.replace_all(&spelling.text, self.replacement.as_str());
        if result == spelling.text {
            return false;
        }
        spelling.text = result.into_owned();
        true
    }
}

pub struct Erasion {
    pattern: Regex,
}

impl Erasion {
    fn parse(args: &[&str]) -> Option<Self> {
        let pattern = args.get(1).filter(|s| !s.is_empty())?;
        let pattern = anchored(pattern);
        Some(Self { pattern: Regex::new(&pattern).ok()? })
    }
}

impl Calculation for Erasion {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        if spelling.text.is_empty() || !self.pattern.is_match(&spelling.text) {
            return false;
        }
        spelling.text.clear();
        true
    }

    fn deletion(&self) -> bool {
        true
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Same mechanics as [`Transformation`], but alternate spellings it derives
/// keep `SpellingType::Normal` rather than being marked fuzzy or
/// abbreviated, since a derived spelling is meant to read as fully valid.
pub struct Derivation(Transformation);

impl Derivation {
    fn parse(args: &[&str]) -> Option<Self> {
        Transformation::parse(args).map(Derivation)
    }
}

impl Calculation for Derivation {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        self.0.apply(spelling)
    }

    fn addition(&self) -> bool {
        true
    }
}

pub struct Fuzzing(Transformation);

impl Fuzzing {
    fn parse(args: &[&str]) -> Option<Self> {
        Transformation::parse(args).map(Fuzzing)
    }
}

impl Calculation for Fuzzing {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        if self.0.apply(spelling) {
            spelling.spelling_type = SpellingType::Fuzzy;
            spelling.credibility += FUZZY_SPELLING_PENALTY;
            true
        } else {
            false
        }
    }

    fn addition(&self) -> bool {
        true
    }
}

pub struct Abbreviation(Transformation);

impl Abbreviation {
    fn parse(args: &[&str]) -> Option<Self> {
        Transformation::parse(args).map(Abbreviation)
    }
}

impl Calculation for Abbreviation {
    fn apply(&self, spelling: &mut CalcSpelling) -> bool {
        if self.0.apply(spelling) {
            spelling.spelling_type = SpellingType::Abbrev;
            spelling.credibility += ABBREVIATION_PENALTY;
            true
        } else {
            false
        }
    }

    fn addition(&self) -> bool {
        true
    }
}

/// Parses calculus definition strings (`"xlit/ABC/abc/"`) into
/// [`Calculation`]s by token.
pub struct Calculus {
    factories: HashMap<&'static str, fn(&[&str]) -> Option<Box<dyn Calculation>>>,
}

impl Default for Calculus {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculus {
    pub fn new() -> Self {
        let mut factories: HashMap<&'static str, fn(&[&str]) -> Option<Box<dyn Calculation>>> = HashMap::new();
        factories.insert("xlit", |a| Transliteration::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        factories.insert("xform", |a| Transformation::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        factories.insert("erase", |a| Erasion::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        factories.insert("derive", |a| Derivation::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        factories.insert("fuzz", |a| Fuzzing::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        factories.insert("abbrev", |a| Abbreviation::parse(a).map(|c| Box::new(c) as Box<dyn Calculation>));
        Self { factories }
    }

    /// Parse one definition line. The separator is whatever character
    /// first breaks the run of lowercase letters that names the token
    /// (almost always `/`).
    pub fn parse(&self, definition: &str) -> Option<Box<dyn Calculation>> {
        let sep = definition.chars().find(|c| !c.is_ascii_lowercase())?;
        let args: Vec<&str> = definition.split(sep).collect();
        if args.is_empty() {
            return None;
        }
        let factory = self.factories.get(args[0].trim())?;
        factory(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xlit_maps_characters_one_to_one() {
        let calculus = Calculus::new();
        let calc = calculus.parse("xlit/vu/uv/").unwrap();
        let mut spelling = CalcSpelling::new("nv");
        assert!(calc.apply(&mut spelling));
        assert_eq!(spelling.text, "nu");
    }

    #[test]
    fn xform_applies_regex_replace() {
        let calculus = Calculus::new();
        let calc = calculus.parse("xform/ang$/ag/").unwrap();
        let mut spelling = CalcSpelling::new("zhuang");
        assert!(calc.apply(&mut spelling));
        assert_eq!(spelling.text, "zhuag");
    }

    #[test]
    fn erase_clears_matching_spelling() {
        let calculus = Calculus::new();
        let calc = calculus.parse("erase/^xyz$/").unwrap();
        let mut spelling = CalcSpelling::new("xyz");
        assert!(calc.apply(&mut spelling));
        assert!(spelling.text.is_empty());
    }

    #[test]
    fn erase_leaves_non_matching_untouched() {
        let calculus = Calculus::new();
        let calc = calculus.parse("erase/^xyz$/").unwrap();
        let mut spelling = CalcSpelling::new("abc");
        assert!(!calc.apply(&mut spelling));
        assert_eq!(spelling.text, "abc");
    }

    #[test]
    fn fuzz_marks_type_and_applies_penalty() {
        let calculus = Calculus::new();
        let calc = calculus.parse("fuzz/([aeiou])n$/$1ng/").unwrap();
        let mut spelling = CalcSpelling::new("hen");
        assert!(calc.apply(&mut spelling));
        assert_eq!(spelling.text, "heng");
        assert_eq!(spelling.spelling_type, SpellingType::Fuzzy);
        assert_eq!(spelling.credibility, FUZZY_SPELLING_PENALTY);
    }

    #[test]
    fn abbrev_marks_type_and_applies_penalty() {
        let calculus = Calculus::new();
        let calc = calculus.parse("abbrev/^(.).*$/$1/").unwrap();
        let mut spelling = CalcSpelling::new("zhong");
        assert!(calc.apply(&mut spelling));
        assert_eq!(spelling.text, "z");
        assert_eq!(spelling.spelling_type, SpellingType::Abbrev);
        assert_eq!(spelling.credibility, ABBREVIATION_PENALTY);
    }

    #[test]
    fn unknown_token_returns_none() {
        let calculus = Calculus::new();
        assert!(calculus.parse("bogus/a/b/").is_none());
    }

    #[test]
    fn fuzz_keeps_original_and_adds_derived_spelling() {
        let calculus = Calculus::new();
        let calc = calculus.parse("fuzz/([aeiou])n$/$1ng/").unwrap();
        let out = apply_rule(vec![CalcSpelling::new("hen")], calc.as_ref());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "hen");
        assert_eq!(out[0].spelling_type, SpellingType::Normal);
        assert_eq!(out[1].text, "heng");
        assert_eq!(out[1].spelling_type, SpellingType::Fuzzy);
    }

    #[test]
    fn erase_drops_matching_spelling_without_adding() {
        let calculus = Calculus::new();
        let calc = calculus.parse("erase/^xyz$/").unwrap();
        let out = apply_rule(vec![CalcSpelling::new("xyz"), CalcSpelling::new("abc")], calc.as_ref());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "abc");
    }

    #[test]
    fn xform_replaces_in_place_without_duplicating() {
        let calculus = Calculus::new();
        let calc = calculus.parse("xform/ang$/ag/").unwrap();
        let out = apply_rule(vec![CalcSpelling::new("zhuang")], calc.as_ref());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "zhuag");
    }
}
