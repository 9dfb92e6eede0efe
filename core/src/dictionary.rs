//! Dictionary: combines a compiled [`Table`] and a learned
//! [`UserDictionary`] by walking a [`SyllableGraph`], the way the teacher's
//! `Engine::generate_candidates_from_segmentation` walks its syllable DP
//! table but over a graph of edges instead of a single linear string.

use crate::model::{Code, DictEntry, SyllableId};
use crate::syllabifier::SyllableGraph;
use crate::table::Table;
use crate::user_dictionary::UserDictionary;

/// One path through the syllable graph paired with the entries it matched.
#[derive(Debug, Clone)]
pub struct DictEntryCollector {
    pub start: usize,
    pub end: usize,
    pub entries: Vec<DictEntry>,
}

pub struct Dictionary<'a> {
    table: &'a Table,
    user_dict: Option<&'a UserDictionary>,
}

impl<'a> Dictionary<'a> {
    pub fn new(table: &'a Table, user_dict: Option<&'a UserDictionary>) -> Self {
        Self { table, user_dict }
    }

    /// Walk every path through `graph` starting at `start`, advancing a
    /// `TableQuery` one syllable at a time and collecting entries at every
    /// vertex reached, merging in user-learned entries for the same code.
    pub fn lookup(&self, graph: &SyllableGraph, start: usize) -> Vec<DictEntryCollector> {
        let mut out = Vec::new();
        let mut query = self.table.query();
        self.walk(graph, start, &mut query, &mut Vec::new(), &mut out);
        out
    }

    fn walk(
        &self,
        graph: &SyllableGraph,
        pos: usize,
        query: &mut crate::table::TableQuery<'a>,
        code_so_far: &mut Vec<SyllableId>,
        out: &mut Vec<DictEntryCollector>,
    ) {
        let Some(ends) = graph.edges.get(&pos) else {
            return;
        };
        for (&end, props) in ends.iter() {
            for prop in props {
                query.advance(prop.syllable_id);
                code_so_far.push(prop.syllable_id);

                let mut entries: Vec<DictEntry> = query.access().to_vec();
                if let Some(user_dict) = self.user_dict {
                    if let Ok(user_entries) = user_dict.lookup(code_so_far) {
                        entries.extend(
                            user_entries
                                .into_iter()
                                .filter(|e| e.code.0 == *code_so_far),
                        );
                    }
                }
                if !entries.is_empty() {
                    entries.sort();
                    out.push(DictEntryCollector {
                        start: pos,
                        end,
                        entries,
                    });
                }

                if query.has_extensions() {
                    self.walk(graph, end, query, code_so_far, out);
                }

                code_so_far.pop();
                query.backdate();
            }
        }
    }

    pub fn exact(&self, code: &Code) -> Vec<DictEntry> {
        let mut entries = self.table.exact_lookup(code).to_vec();
        if let Some(user_dict) = self.user_dict {
            if let Ok(user_entries) = user_dict.lookup(&code.0) {
                entries.extend(user_entries.into_iter().filter(|e| &e.code == code));
            }
        }
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpellingProperties;
    use std::collections::BTreeMap;

    fn sample_table() -> Table {
        let mut m = BTreeMap::new();
        m.insert(Code(vec![1, 2]), vec![DictEntry::new("你好", Code(vec![1, 2]), 10.0)]);
        m.insert(Code(vec![1]), vec![DictEntry::new("你", Code(vec![1]), 5.0)]);
        Table::build(m, 0, 0)
    }

    fn sample_graph() -> SyllableGraph {
        let mut graph = SyllableGraph {
            input_length: 4,
            interpreted_length: 4,
            vertices: Default::default(),
            edges: Default::default(),
            indices: Default::default(),
        };
        graph
            .edges
            .entry(0)
            .or_default()
            .entry(2)
            .or_default()
            .push(SpellingProperties::normal(1, 2));
        graph
            .edges
            .entry(2)
            .or_default()
            .entry(4)
            .or_default()
            .push(SpellingProperties::normal(2, 4));
        graph
    }

    #[test]
    fn lookup_collects_entries_along_every_path() {
        let table = sample_table();
        let graph = sample_graph();
        let dict = Dictionary::new(&table, None);
        let hits = dict.lookup(&graph, 0);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|c| c.entries[0].text == "你"));
        assert!(hits.iter().any(|c| c.entries[0].text == "你好"));
    }

    #[test]
    fn exact_matches_only_full_code() {
        let table = sample_table();
        let dict = Dictionary::new(&table, None);
        assert_eq!(dict.exact(&Code(vec![1, 2]))[0].text, "你好");
        assert!(dict.exact(&Code(vec![9])).is_empty());
    }
}
