//! Translator: turns dictionary hits along a syllable-graph path into
//! scored [`Candidate`]s.

use crate::candidate::{Candidate, CandidateKind};
use crate::dictionary::Dictionary;
use crate::syllabifier::SyllableGraph;

pub struct Translator<'a> {
    dictionary: Dictionary<'a>,
}

impl<'a> Translator<'a> {
    pub fn new(dictionary: Dictionary<'a>) -> Self {
        Self { dictionary }
    }

    /// Candidates for every path through `graph` starting at `start`,
    /// tagged `Phrase` for multi-syllable codes and `Simple` otherwise.
    pub fn translate(&self, graph: &SyllableGraph, start: usize) -> Vec<Candidate> {
        let mut out = Vec::new();
        for collector in self.dictionary.lookup(graph, start) {
            for entry in &collector.entries {
                let kind = if entry.code.len() > 1 {
                    CandidateKind::Phrase
                } else {
                    CandidateKind::Simple
                };
                out.push(
                    Candidate::new(entry.text.clone(), entry.weight as f32)
                        .with_span(collector.start, collector.end)
                        .with_kind(kind),
                );
            }
        }
        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    /// Greedily assemble a full-sentence candidate by always taking the
    /// best-scoring edge out of the last confirmed vertex, the same
    /// longest-normal-edge walk the segmentor uses to seed its initial
    /// composition guess.
    pub fn translate_sentence(&self, graph: &SyllableGraph) -> Option<Candidate> {
        let mut text = String::new();
        let mut score = 0.0f32;
        let mut pos = 0;
        while pos < graph.interpreted_length {
            let candidates = self.translate(graph, pos);
            let best = candidates.into_iter().next()?;
            text.push_str(&best.text);
            score += best.score;
            pos = best.end;
        }
        if text.is_empty() {
            None
        } else {
            Some(
                Candidate::new(text, score)
                    .with_span(0, graph.interpreted_length)
                    .with_kind(CandidateKind::Sentence),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, DictEntry, SpellingProperties};
    use crate::syllabifier::SyllableGraph;
    use crate::table::Table;
    use std::collections::BTreeMap;

    fn table_with(text: &str, code: Vec<u32>, weight: f64) -> Table {
        let mut m = BTreeMap::new();
        m.insert(Code(code.clone()), vec![DictEntry::new(text, Code(code), weight)]);
        Table::build(m, 0, 0)
    }

    fn single_edge_graph(syllable_id: u32, end: usize) -> SyllableGraph {
        let mut graph = SyllableGraph {
            input_length: end,
            interpreted_length: end,
            vertices: Default::default(),
            edges: Default::default(),
            indices: Default::default(),
        };
        graph
            .edges
            .entry(0)
            .or_default()
            .entry(end)
            .or_default()
            .push(SpellingProperties::normal(syllable_id, end));
        graph
    }

    #[test]
    fn translate_yields_ranked_candidates() {
        let table = table_with("你", vec![1], 10.0);
        let dict = Dictionary::new(&table, None);
        let translator = Translator::new(dict);
        let graph = single_edge_graph(1, 2);
        let hits = translator.translate(&graph, 0);
        assert_eq!(hits[0].text, "你");
        assert_eq!(hits[0].kind, CandidateKind::Simple);
    }
}
