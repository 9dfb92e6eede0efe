//! Table: a phrase dictionary keyed by [`Code`], queried incrementally.
//!
//! The teacher's `Lexicon` (`lib.rs`) already pairs an `fst::Map` index with
//! a bincode-serialized payload vector; `Table` keeps that same shape but
//! keys on syllable-id sequences rather than raw strings, and exposes the
//! incremental `TableQuery` cursor spec.md's dictionary-construction step
//! needs (advance one syllable at a time while walking a syllable graph,
//! rather than re-querying the whole code each time).

use crate::error::{CoreError, CoreResult};
use crate::mapped::MappedRegion;
use crate::model::{Code, DictEntry, SyllableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const TABLE_FORMAT: &str = "Table/3.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableMetadata {
    format: String,
    dict_file_checksum: u32,
    schema_file_checksum: u32,
}

/// A compiled phrase table: code (as a sequence of syllable ids) → entries
/// sharing that code, plus the syllabary those ids index into (spec.md
/// §6.2's `Syllabary: Array<StringRef>`).
pub struct Table {
    metadata: TableMetadata,
    syllabary: Vec<String>,
    entries: BTreeMap<Code, Vec<DictEntry>>,
}

impl Table {
    pub fn build(
        entries: BTreeMap<Code, Vec<DictEntry>>,
        dict_file_checksum: u32,
        schema_file_checksum: u32,
    ) -> Self {
        Self::build_with_syllabary(entries, Vec::new(), dict_file_checksum, schema_file_checksum)
    }

    pub fn build_with_syllabary(
        entries: BTreeMap<Code, Vec<DictEntry>>,
        syllabary: Vec<String>,
        dict_file_checksum: u32,
        schema_file_checksum: u32,
    ) -> Self {
        let mut entries = entries;
        for v in entries.values_mut() {
            v.sort();
        }
        Self {
            metadata: TableMetadata {
                format: TABLE_FORMAT.to_string(),
                dict_file_checksum,
                schema_file_checksum,
            },
            syllabary,
            entries,
        }
    }

    pub fn syllable_text(&self, id: SyllableId) -> Option<&str> {
        self.syllabary.get(id as usize).map(String::as_str)
    }

    pub fn iter_entries(&self) -> impl Iterator<Item = &DictEntry> {
        self.entries.values().flatten()
    }

    pub fn checksums_match(&self, dict_file_checksum: u32, schema_file_checksum: u32) -> bool {
        self.metadata.dict_file_checksum == dict_file_checksum
            && self.metadata.schema_file_checksum == schema_file_checksum
    }

    pub fn exact_lookup(&self, code: &Code) -> &[DictEntry] {
        self.entries.get(code).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All codes that are at least `code` as a prefix (for partial-key
    /// lookups over a growing syllable-graph path).
    pub fn prefix_lookup(&self, code: &[SyllableId]) -> Vec<(&Code, &[DictEntry])> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with(code))
            .map(|(k, v)| (k, v.as_slice()))
            .collect()
    }

    pub fn query(&self) -> TableQuery<'_> {
        TableQuery {
            table: self,
            prefix: Vec::new(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let mut region = MappedRegion::create(4096);
        region.allocate(&self.metadata)?;
        region.allocate(&self.syllabary)?;
        region.allocate(&self.entries)?;
        region.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let region = MappedRegion::open_ro(path)?;
        let mut cursor = 0usize;
        let (metadata, next) = read_record::<TableMetadata>(region.as_bytes(), cursor)?;
        cursor = next;
        let (syllabary, next) = read_record::<Vec<String>>(region.as_bytes(), cursor)?;
        cursor = next;
        let (entries, _) = read_record::<BTreeMap<Code, Vec<DictEntry>>>(region.as_bytes(), cursor)?;
        if metadata.format != TABLE_FORMAT {
            return Err(CoreError::Format(format!(
                "unexpected table format: {}",
                metadata.format
            )));
        }
        Ok(Self { metadata, syllabary, entries })
    }
}

fn read_record<T: serde::de::DeserializeOwned>(buf: &[u8], offset: usize) -> CoreResult<(T, usize)> {
    if offset + 8 > buf.len() {
        return Err(CoreError::Format("truncated table file".into()));
    }
    let len = u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap()) as usize;
    let start = offset + 8;
    let end = start + len;
    if end > buf.len() {
        return Err(CoreError::Format("truncated table record".into()));
    }
    let value = bincode::deserialize(&buf[start..end])
        .map_err(|e| CoreError::Format(format!("bincode decode: {e}")))?;
    Ok((value, end))
}

/// A stateful cursor over a [`Table`], advanced one syllable at a time.
///
/// Mirrors spec.md's access/advance/backdate/reset protocol: `advance`
/// extends the queried code by one syllable and re-narrows the candidate
/// set, `backdate` undoes the last `advance`, `reset` clears the cursor.
pub struct TableQuery<'a> {
    table: &'a Table,
    prefix: Vec<SyllableId>,
}

impl<'a> TableQuery<'a> {
    pub fn advance(&mut self, syllable_id: SyllableId) -> &mut Self {
        self.prefix.push(syllable_id);
        self
    }

    pub fn backdate(&mut self) -> &mut Self {
        self.prefix.pop();
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        self.prefix.clear();
        self
    }

    /// Entries whose code exactly equals the accumulated prefix.
    pub fn access(&self) -> &'a [DictEntry] {
        let code = Code(self.prefix.clone());
        self.table.exact_lookup(&code)
    }

    /// Whether any entry has the accumulated prefix as a strict or equal
    /// prefix of its code (i.e. whether advancing further can still match).
    pub fn has_extensions(&self) -> bool {
        !self.table.prefix_lookup(&self.prefix).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut m = BTreeMap::new();
        m.insert(
            Code(vec![1, 2]),
            vec![DictEntry::new("你好", Code(vec![1, 2]), 10.0)],
        );
        m.insert(
            Code(vec![1, 2, 3]),
            vec![DictEntry::new("你好吗", Code(vec![1, 2, 3]), 5.0)],
        );
        m.insert(Code(vec![1]), vec![DictEntry::new("你", Code(vec![1]), 8.0)]);
        Table::build(m, 0, 0)
    }

    #[test]
    fn exact_lookup_returns_sorted_entries() {
        let table = sample_table();
        let hits = table.exact_lookup(&Code(vec![1, 2]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "你好");
    }

    #[test]
    fn query_advances_and_backdates() {
        let table = sample_table();
        let mut q = table.query();
        q.advance(1);
        assert_eq!(q.access()[0].text, "你");
        assert!(q.has_extensions());
        q.advance(2);
        assert_eq!(q.access()[0].text, "你好");
        q.backdate();
        assert_eq!(q.access()[0].text, "你");
        q.reset();
        assert!(q.access().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.table.bin");
        table.save(&path).unwrap();
        let loaded = Table::load(&path).unwrap();
        assert_eq!(loaded.exact_lookup(&Code(vec![1, 2])).len(), 1);
    }
}
