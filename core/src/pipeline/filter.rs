//! Filter: post-processes a translator's raw candidate list before it
//! reaches the menu — deduplication, masking, and reordering.

use crate::candidate::{Candidate, CandidateKind};
use std::collections::HashSet;

pub trait Filter {
    fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Marks candidates whose text has already appeared as `Shadow` and drops
/// them, keeping only the highest-scoring candidate per distinct text.
pub struct UniquifyFilter;

impl Filter for UniquifyFilter {
    fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| seen.insert(c.text.clone()))
            .collect()
    }
}

/// Drops any candidate whose text is in the masked set (spec's
/// `masked_phrases` style hiding, now expressed as a pipeline stage rather
/// than a config field the engine has to special-case).
pub struct MaskFilter {
    masked: HashSet<String>,
}

impl MaskFilter {
    pub fn new(masked: HashSet<String>) -> Self {
        Self { masked }
    }
}

impl Filter for MaskFilter {
    fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|c| !self.masked.contains(&c.text))
            .collect()
    }
}

/// Re-sorts by score, descending, stable on ties (so equally scored
/// dictionary entries keep their original relative order).
pub struct RankFilter;

impl Filter for RankFilter {
    fn apply(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates
    }
}

/// Runs a sequence of filters left to right.
pub struct FilterChain(pub Vec<Box<dyn Filter>>);

impl FilterChain {
    pub fn run(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        self.0.iter().fold(candidates, |acc, f| f.apply(acc))
    }
}

#[allow(dead_code)]
fn is_simple_or_phrase(c: &Candidate) -> bool {
    matches!(c.kind, CandidateKind::Simple | CandidateKind::Phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniquify_keeps_first_occurrence() {
        let filter = UniquifyFilter;
        let out = filter.apply(vec![Candidate::new("你好", 10.0), Candidate::new("你好", 5.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 10.0);
    }

    #[test]
    fn mask_filter_drops_masked_text() {
        let mut masked = HashSet::new();
        masked.insert("脏话".to_string());
        let filter = MaskFilter::new(masked);
        let out = filter.apply(vec![Candidate::new("脏话", 1.0), Candidate::new("你好", 1.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "你好");
    }

    #[test]
    fn chain_runs_filters_in_order() {
        let chain = FilterChain(vec![Box::new(UniquifyFilter), Box::new(RankFilter)]);
        let out = chain.run(vec![Candidate::new("a", 1.0), Candidate::new("b", 2.0)]);
        assert_eq!(out[0].text, "b");
    }
}
