//! Builds a [`SyllableGraph`] over raw input bytes using a [`Prism`].
//!
//! This is the Rust-native replacement for the teacher's ad hoc
//! `Engine::generate_candidates_from_segmentation` DP pass (`core/src/
//! engine.rs`): instead of running the dynamic-programming word search
//! directly over raw syllable strings, the syllabifier first produces a
//! position graph, which `dictionary.rs` and `corrector.rs` then query —
//! matching spec.md §4.G's priority-queue BFS over vertices rather than a
//! single best-path table.

use crate::corrector::Corrector;
use crate::model::{SpellingProperties, SpellingType, SyllableId};
use crate::prism::Prism;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

/// The DAG of possible syllabifications of one input string.
#[derive(Debug, Clone, Default)]
pub struct SyllableGraph {
    pub input_length: usize,
    pub interpreted_length: usize,
    /// `vertices[pos]` is the best (lowest-rank) type reached at `pos`.
    pub vertices: BTreeMap<usize, SpellingType>,
    /// `edges[start][end]` is the set of spelling properties for that span.
    pub edges: BTreeMap<usize, BTreeMap<usize, Vec<SpellingProperties>>>,
    /// Transpose index: `indices[pos][syllable_id]` lists every property
    /// record for an edge *ending* at `pos` with that syllable.
    pub indices: BTreeMap<usize, HashMap<SyllableId, Vec<SpellingProperties>>>,
}

impl SyllableGraph {
    pub fn edge(&self, start: usize, end: usize) -> Option<&[SpellingProperties]> {
        self.edges.get(&start)?.get(&end).map(|v| v.as_slice())
    }

    fn add_edge(&mut self, start: usize, end: usize, props: SpellingProperties) {
        self.edges
            .entry(start)
            .or_default()
            .entry(end)
            .or_default()
            .push(props.clone());
        self.indices
            .entry(end)
            .or_default()
            .entry(props.syllable_id)
            .or_default()
            .push(props);
    }

    fn raise_vertex(&mut self, pos: usize, t: SpellingType) {
        let entry = self.vertices.entry(pos).or_insert(t);
        *entry = (*entry).min(t);
    }
}

#[derive(PartialEq, Eq)]
struct QueueItem {
    // `SpellingType` already orders "better" types lower; wrap both fields
    // in `Reverse` so the max-heap pops the best type at the earliest
    // position first.
    spelling_type: std::cmp::Reverse<SpellingType>,
    pos: std::cmp::Reverse<usize>,
}

impl QueueItem {
    fn new(pos: usize, t: SpellingType) -> Self {
        Self {
            spelling_type: std::cmp::Reverse(t),
            pos: std::cmp::Reverse(pos),
        }
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.spelling_type.cmp(&other.spelling_type).then(self.pos.cmp(&other.pos))
    }
}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds a [`SyllableGraph`] from raw input, optionally with typo
/// correction and completion.
pub struct Syllabifier<'a> {
    prism: &'a Prism,
    corrector: Option<&'a Corrector>,
    delimiters: &'a [char],
    enable_completion: bool,
    completion_limit: usize,
    completion_penalty: f64,
}

impl<'a> Syllabifier<'a> {
    pub fn new(prism: &'a Prism, delimiters: &'a [char]) -> Self {
        Self {
            prism,
            corrector: None,
            delimiters,
            enable_completion: false,
            completion_limit: 32,
            completion_penalty: 2.0,
        }
    }

    pub fn with_corrector(mut self, corrector: &'a Corrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    pub fn with_completion(mut self, limit: usize, penalty: f64) -> Self {
        self.enable_completion = true;
        self.completion_limit = limit;
        self.completion_penalty = penalty;
        self
    }

    /// Build the graph. Deterministic given the same input, Prism and
    /// Corrector (spec.md §4.G closing guarantee).
    pub fn build(&self, input: &str) -> SyllableGraph {
        let mut graph = SyllableGraph {
            input_length: input.len(),
            interpreted_length: 0,
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            indices: BTreeMap::new(),
        };

        let mut queue = BinaryHeap::new();
        let mut visited: HashMap<usize, SpellingType> = HashMap::new();
        graph.raise_vertex(0, SpellingType::Normal);
        queue.push(QueueItem::new(0, SpellingType::Normal));
        let mut farthest = 0usize;

        while let Some(item) = queue.pop() {
            let pos = item.pos.0;
            let cur_type = item.spelling_type.0;
            if let Some(seen) = visited.get(&pos) {
                if *seen <= cur_type {
                    continue;
                }
            }
            visited.insert(pos, cur_type);
            farthest = farthest.max(pos);

            if pos >= input.len() {
                continue;
            }

            for (descs, len) in self.prism.common_prefix_search(&input[pos..]) {
                let mut end = pos + len;
                // consume trailing delimiter bytes
                while end < input.len()
                    && input[end..]
                        .chars()
                        .next()
                        .map(|c| self.delimiters.contains(&c))
                        .unwrap_or(false)
                {
                    end += input[end..].chars().next().unwrap().len_utf8();
                }
                for prop in Prism::query_spelling(descs, end) {
                    let edge_type = cur_type.worse(prop.spelling_type);
                    graph.raise_vertex(end, edge_type);
                    graph.add_edge(pos, end, prop);
                    queue.push(QueueItem::new(end, edge_type));
                }
            }

            if let Some(corrector) = self.corrector {
                for correction in corrector.correct(self.prism, &input[pos..], input.len() - pos) {
                    if let Some(descs) = self.prism.exact_match(&correction.key) {
                        let end = pos + correction.consumed_len;
                        for mut prop in Prism::query_spelling(descs, end) {
                            prop.spelling_type = SpellingType::Correction;
                            prop.credibility -= correction.penalty;
                            graph.raise_vertex(end, SpellingType::Correction);
                            graph.add_edge(pos, end, prop);
                            queue.push(QueueItem::new(end, SpellingType::Correction));
                        }
                    }
                }
            }
        }

        graph.interpreted_length = farthest;
        self.prune(&mut graph, farthest);

        if self.enable_completion && farthest < input.len() {
            self.add_completions(&mut graph, input, farthest);
        }

        graph
    }

    /// Keep only vertices that can reach `farthest`; at each retained
    /// vertex, drop edges whose type is worse than the vertex's own type
    /// (spec.md §4.G step 5 / invariant 2).
    fn prune(&self, graph: &mut SyllableGraph, farthest: usize) {
        let mut reaches_farthest: std::collections::HashSet<usize> = std::collections::HashSet::new();
        reaches_farthest.insert(farthest);
        // Backward closure: a vertex reaches `farthest` if some edge from
        // it lands on a vertex that reaches farthest (or is farthest).
        let mut changed = true;
        while changed {
            changed = false;
            for (&start, ends) in graph.edges.iter() {
                if reaches_farthest.contains(&start) {
                    continue;
                }
                if ends.keys().any(|e| reaches_farthest.contains(e)) {
                    reaches_farthest.insert(start);
                    changed = true;
                }
            }
        }
        graph.vertices.retain(|pos, _| reaches_farthest.contains(pos));
        graph.edges.retain(|start, ends| {
            if !reaches_farthest.contains(start) {
                return false;
            }
            ends.retain(|end, _| reaches_farthest.contains(end));
            !ends.is_empty()
        });
        // Rebuild the transpose index from the pruned edges.
        graph.indices.clear();
        for ends in graph.edges.values() {
            for (&end, props) in ends.iter() {
                for p in props {
                    graph
                        .indices
                        .entry(end)
                        .or_default()
                        .entry(p.syllable_id)
                        .or_default()
                        .push(p.clone());
                }
            }
        }
    }

    fn add_completions(&self, graph: &mut SyllableGraph, input: &str, farthest: usize) {
        let has_normal_edge_to_end = graph
            .edges
            .get(&farthest)
            .map(|ends| ends.contains_key(&input.len()))
            .unwrap_or(false);
        if has_normal_edge_to_end {
            return;
        }
        for (descs, _len) in self
            .prism
            .expand_search(&input[farthest..], self.completion_limit)
        {
            for mut prop in Prism::query_spelling(descs, input.len()) {
                prop.spelling_type = SpellingType::Completion;
                prop.credibility -= self.completion_penalty;
                graph.raise_vertex(input.len(), SpellingType::Completion);
                graph.add_edge(farthest, input.len(), prop);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn pinyin_like_prism() -> Prism {
        let mut m = BTreeMap::new();
        for (i, s) in ["a", "an", "cha", "chan", "chang", "gan", "han", "hang", "na", "tu", "tuan"]
            .iter()
            .enumerate()
        {
            m.insert(s.to_string(), desc(i as SyllableId));
        }
        Prism::build(m, 0, 0).unwrap()
    }

    #[test]
    fn scenario_a_single_vowel() {
        let prism = pinyin_like_prism();
        let graph = Syllabifier::new(&prism, &[]).build("a");
        assert_eq!(graph.interpreted_length, 1);
        assert!(graph.vertices.contains_key(&0));
        assert!(graph.vertices.contains_key(&1));
        assert!(graph.edge(0, 1).is_some());
    }

    #[test]
    fn scenario_b_failed_tail() {
        let prism = pinyin_like_prism();
        let graph = Syllabifier::new(&prism, &[]).build("ang");
        assert_eq!(graph.interpreted_length, 2);
        assert!(!graph.vertices.contains_key(&1));
        let edge = graph.edge(0, 2).unwrap();
        assert_eq!(edge.len(), 1);
    }

    #[test]
    fn scenario_c_ambiguous_split() {
        let prism = pinyin_like_prism();
        let graph = Syllabifier::new(&prism, &[]).build("changan");
        for v in [0usize, 4, 5, 7] {
            assert!(graph.vertices.contains_key(&v), "missing vertex {v}");
        }
        assert!(graph.edge(0, 4).is_some()); // chan
        assert!(graph.edge(0, 5).is_some()); // chang
        assert!(graph.edge(4, 7).is_some()); // gan
        assert!(graph.edge(5, 7).is_some()); // an
    }

    #[test]
    fn scenario_d_prefix_vs_extension() {
        let prism = pinyin_like_prism();
        let graph = Syllabifier::new(&prism, &[]).build("tuan");
        for v in [0usize, 2, 4] {
            assert!(graph.vertices.contains_key(&v), "missing vertex {v}");
        }
        assert!(graph.edge(0, 2).is_some()); // tu
        assert!(graph.edge(0, 4).is_some()); // tuan
        assert!(graph.edge(2, 4).is_some()); // an
    }

    #[test]
    fn segmentation_non_overlap_invariant_holds() {
        let prism = pinyin_like_prism();
        let graph = Syllabifier::new(&prism, &[]).build("changantu");
        for (&start, ends) in graph.edges.iter() {
            for &end in ends.keys() {
                assert!(end > start);
                assert!(end <= graph.input_length);
            }
        }
    }
}
