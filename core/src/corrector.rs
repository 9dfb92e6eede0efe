//! Optional near-neighbor correction over a Prism's alphabet.
//!
//! Grounded in the teacher's `fuzzy::FuzzyMap` (syllable → alternatives with
//! penalties) but generalized from a fixed rule table to on-the-fly
//! single-substitution and adjacent-transposition hypotheses, matched
//! against whatever alphabet the Prism was built with.

use crate::prism::Prism;

/// A correction hypothesis: the alternate key, how many input bytes it
/// consumed, and the credibility penalty to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub key: String,
    pub consumed_len: usize,
    pub penalty: f64,
}

/// Produces correction hypotheses within edit distance 1 of a probe string.
pub struct Corrector {
    substitution_penalty: f64,
    transposition_penalty: f64,
}

impl Default for Corrector {
    fn default() -> Self {
        Self {
            substitution_penalty: 1.0,
            transposition_penalty: 0.5,
        }
    }
}

impl Corrector {
    pub fn new(substitution_penalty: f64, transposition_penalty: f64) -> Self {
        Self {
            substitution_penalty,
            transposition_penalty,
        }
    }

    /// Generate every single-substitution and adjacent-transposition
    /// variant of `input[pos..]`'s leading bytes (bounded by `max_len`) that
    /// the Prism's alphabet can produce, and that actually exist in the
    /// Prism as a valid spelling prefix.
    pub fn correct(&self, prism: &Prism, probe: &str, max_len: usize) -> Vec<Correction> {
        let mut out = Vec::new();
        let alphabet = &prism.metadata().alphabet;
        let bytes = probe.as_bytes();
        let bound = max_len.min(bytes.len());

        // Single-substitution: replace one byte at a time with every other
        // alphabet byte and see if a longer common-prefix match appears.
        for i in 0..bound {
            for &alt in alphabet {
                if alt == bytes[i] {
                    continue;
                }
                let mut candidate = bytes[..bound].to_vec();
                candidate[i] = alt;
                if let Ok(candidate_str) = String::from_utf8(candidate) {
                    if prism.exact_match(&candidate_str).is_some() {
                        out.push(Correction {
                            key: candidate_str,
                            consumed_len: bound,
                            penalty: self.substitution_penalty,
                        });
                    }
                }
            }
        }

        // Adjacent transposition: swap each pair of neighboring bytes.
        for i in 0..bound.saturating_sub(1) {
            let mut candidate = bytes[..bound].to_vec();
            candidate.swap(i, i + 1);
            if let Ok(candidate_str) = String::from_utf8(candidate) {
                if prism.exact_match(&candidate_str).is_some() {
                    out.push(Correction {
                        key: candidate_str,
                        consumed_len: bound,
                        penalty: self.transposition_penalty,
                    });
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SpellingType, SyllableId};
    use crate::prism::SpellingDescriptor;
    use std::collections::BTreeMap;

    fn desc(id: SyllableId) -> Vec<SpellingDescriptor> {
        vec![SpellingDescriptor {
            syllable_id: id,
            spelling_type: SpellingType::Normal,
            credibility: 0.0,
            tips: None,
        }]
    }

    #[test]
    fn finds_single_substitution_correction() {
        let mut m = BTreeMap::new();
        m.insert("gan".to_string(), desc(0));
        m.insert("han".to_string(), desc(1));
        let prism = Prism::build(m, 0, 0).unwrap();

        let corrector = Corrector::default();
        let hits = corrector.correct(&prism, "gan", 3);
        assert!(hits.iter().any(|c| c.key == "han"));
    }

    #[test]
    fn finds_transposition_correction() {
        let mut m = BTreeMap::new();
        m.insert("na".to_string(), desc(0));
        m.insert("an".to_string(), desc(1));
        let prism = Prism::build(m, 0, 0).unwrap();

        let corrector = Corrector::default();
        let hits = corrector.correct(&prism, "na", 2);
        assert!(hits.iter().any(|c| c.key == "an" && c.penalty > 0.0));
    }
}
