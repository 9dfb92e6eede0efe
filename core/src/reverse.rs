//! ReverseDb: text → codes, the inverse of [`crate::table::Table`].
//!
//! Built the same way the teacher's `Lexicon` pairs an in-memory map with an
//! optional FST-backed on-disk form (`lib.rs`), but keyed the other
//! direction: given a phrase, list every spelling code that produces it, for
//! features like "show me how to type this character" and reverse lookup
//! during dictionary compilation dedup.

use crate::error::{CoreError, CoreResult};
use crate::mapped::MappedRegion;
use crate::model::Code;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const REVERSE_FORMAT: &str = "ReverseDb/1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReverseMetadata {
    format: String,
    dict_file_checksum: u32,
}

pub struct ReverseDb {
    metadata: ReverseMetadata,
    index: BTreeMap<String, Vec<Code>>,
}

impl ReverseDb {
    pub fn build(index: BTreeMap<String, Vec<Code>>, dict_file_checksum: u32) -> Self {
        let mut index = index;
        for codes in index.values_mut() {
            codes.sort();
            codes.dedup();
        }
        Self {
            metadata: ReverseMetadata {
                format: REVERSE_FORMAT.to_string(),
                dict_file_checksum,
            },
            index,
        }
    }

    pub fn checksums_match(&self, dict_file_checksum: u32) -> bool {
        self.metadata.dict_file_checksum == dict_file_checksum
    }

    pub fn lookup(&self, text: &str) -> &[Code] {
        self.index.get(text).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let mut region = MappedRegion::create(4096);
        region.allocate(&self.metadata)?;
        region.allocate(&self.index)?;
        region.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let region = MappedRegion::open_ro(path)?;
        let mut cursor = 0usize;
        let (metadata, next) = read_record::<ReverseMetadata>(region.as_bytes(), cursor)?;
        cursor = next;
        let (index, _) = read_record::<BTreeMap<String, Vec<Code>>>(region.as_bytes(), cursor)?;
        if metadata.format != REVERSE_FORMAT {
            return Err(CoreError::Format(format!(
                "unexpected reverse db format: {}",
                metadata.format
            )));
        }
        Ok(Self { metadata, index })
    }
}

fn read_record<T: serde::de::DeserializeOwned>(buf: &[u8], offset: usize) -> CoreResult<(T, usize)> {
    if offset + 8 > buf.len() {
        return Err(CoreError::Format("truncated reverse db file".into()));
    }
    let len = u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap()) as usize;
    let start = offset + 8;
    let end = start + len;
    if end > buf.len() {
        return Err(CoreError::Format("truncated reverse db record".into()));
    }
    let value = bincode::deserialize(&buf[start..end])
        .map_err(|e| CoreError::Format(format!("bincode decode: {e}")))?;
    Ok((value, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_sorted_deduped_codes() {
        let mut m = BTreeMap::new();
        m.insert(
            "你好".to_string(),
            vec![Code(vec![1, 2]), Code(vec![1, 2]), Code(vec![3, 4])],
        );
        let db = ReverseDb::build(m, 0);
        assert_eq!(db.lookup("你好"), &[Code(vec![1, 2]), Code(vec![3, 4])]);
        assert!(db.lookup("missing").is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let mut m = BTreeMap::new();
        m.insert("你".to_string(), vec![Code(vec![1])]);
        let db = ReverseDb::build(m, 0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.reverse.bin");
        db.save(&path).unwrap();
        let loaded = ReverseDb::load(&path).unwrap();
        assert_eq!(loaded.lookup("你"), &[Code(vec![1])]);
    }
}
