//! Prism: a spelling → (syllable, properties) index.
//!
//! spec.md calls for a double-array trie; this crate builds that same
//! contract — common-prefix search, bounded expansion, exact match — on top
//! of `fst::Map`, the teacher's existing sorted-string index (`Lexicon`'s
//! `fst_map` field in `lib.rs`). `fst` already stores a minimal acyclic
//! automaton with the same asymptotic shape as a double-array trie; reusing
//! it keeps the dependency stack aligned with the teacher instead of
//! hand-rolling a byte-array trie neither the teacher nor the rest of the
//! pack reaches for. The per-spelling descriptor array and metadata header
//! are new, persisted with `bincode`/`serde` the way the teacher persists
//! `LexEntry`/`Lambdas`.

use crate::error::{CoreError, CoreResult};
use crate::mapped::MappedRegion;
use crate::model::{SpellingProperties, SpellingType, SyllableId};
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const PRISM_FORMAT: &str = "Prism/3.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrismMetadata {
    pub format: String,
    pub alphabet: Vec<u8>,
    pub dict_file_checksum: u32,
    pub schema_file_checksum: u32,
}

/// One descriptor per spelling: which syllable it realizes, under what
/// conditions, and at what credibility penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellingDescriptor {
    pub syllable_id: SyllableId,
    pub spelling_type: SpellingType,
    pub credibility: f64,
    pub tips: Option<String>,
}

/// A compiled Prism: spelling-string → spelling-id index plus descriptors.
pub struct Prism {
    metadata: PrismMetadata,
    map: Map<Vec<u8>>,
    descriptors: Vec<Vec<SpellingDescriptor>>,
}

impl Prism {
    /// Build a Prism over `spellings` (either the raw syllabary, or a
    /// spelling-algebra-expanded script mapping spelling → syllable
    /// descriptors, per spec.md §4.H step 6).
    pub fn build(
        spellings: BTreeMap<String, Vec<SpellingDescriptor>>,
        dict_file_checksum: u32,
        schema_file_checksum: u32,
    ) -> CoreResult<Self> {
        let mut alphabet: Vec<u8> = spellings
            .keys()
            .flat_map(|s| s.bytes())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        alphabet.sort_unstable();
        alphabet.dedup();

        let mut builder = MapBuilder::memory();
        let mut descriptors = Vec::with_capacity(spellings.len());
        for (i, (spelling, descs)) in spellings.into_iter().enumerate() {
            builder
                .insert(spelling.as_bytes(), i as u64)
                .map_err(|e| CoreError::Encoding(format!("fst insert: {e}")))?;
            descriptors.push(descs);
        }
        let bytes = builder
            .into_inner()
            .map_err(|e| CoreError::Encoding(format!("fst finish: {e}")))?;
        let map = Map::new(bytes).map_err(|e| CoreError::Format(format!("fst map: {e}")))?;

        Ok(Self {
            metadata: PrismMetadata {
                format: PRISM_FORMAT.to_string(),
                alphabet,
                dict_file_checksum,
                schema_file_checksum,
            },
            map,
            descriptors,
        })
    }

    pub fn metadata(&self) -> &PrismMetadata {
        &self.metadata
    }

    pub fn checksums_match(&self, dict_file_checksum: u32, schema_file_checksum: u32) -> bool {
        self.metadata.dict_file_checksum == dict_file_checksum
            && self.metadata.schema_file_checksum == schema_file_checksum
    }

    /// All trie keys that are prefixes of `key`, in increasing length, each
    /// paired with its descriptors and matched length.
    pub fn common_prefix_search(&self, key: &str) -> Vec<(&[SpellingDescriptor], usize)> {
        let bytes = key.as_bytes();
        let mut out = Vec::new();
        for len in 1..=bytes.len() {
            // fst requires a valid UTF-8 boundary; syllabary alphabets are
            // ASCII in every schema this engine targets, so byte length ==
            // char boundary here.
            if !key.is_char_boundary(len) {
                continue;
            }
            if let Some(id) = self.map.get(&bytes[..len]) {
                out.push((self.descriptors[id as usize].as_slice(), len));
            }
        }
        out
    }

    /// Exact match only.
    pub fn exact_match(&self, key: &str) -> Option<&[SpellingDescriptor]> {
        self.map
            .get(key.as_bytes())
            .map(|id| self.descriptors[id as usize].as_slice())
    }

    /// BFS-style expansion: every key with `key` as a prefix, capped at
    /// `limit`, each extension's length in excess of `key.len()`.
    pub fn expand_search(&self, key: &str, limit: usize) -> Vec<(&[SpellingDescriptor], usize)> {
        let mut out = Vec::new();
        let mut stream = self
            .map
            .range()
            .ge(key.as_bytes())
            .into_stream();
        while let Some((k, id)) = stream.next() {
            if !k.starts_with(key.as_bytes()) {
                break;
            }
            out.push((self.descriptors[id as usize].as_slice(), k.len()));
            if out.len() >= limit {
                break;
            }
        }
        out
    }

    /// Iterate `(syllable_id, properties)` for a spelling already resolved
    /// to descriptors (used to translate an edge back into graph
    /// properties while preserving each descriptor's own credibility).
    pub fn query_spelling(descs: &[SpellingDescriptor], end_pos: usize) -> Vec<SpellingProperties> {
        descs
            .iter()
            .map(|d| SpellingProperties {
                syllable_id: d.syllable_id,
                spelling_type: d.spelling_type,
                end_pos,
                credibility: d.credibility,
                tips: d.tips.clone(),
            })
            .collect()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let mut region = MappedRegion::create(self.map.as_fst().as_bytes().len() + 4096);
        region.allocate(&self.metadata)?;
        region.allocate(&self.map.as_fst().as_bytes().to_vec())?;
        region.allocate(&self.descriptors)?;
        region.save(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let region = MappedRegion::open_ro(path)?;
        // The three `allocate` calls above wrote sequential records; replay
        // them by offset 0/len-prefixed scan since a fresh `MappedRegion`
        // only exposes `find` by `Offset`, we reconstruct the sequence of
        // offsets deterministically (metadata, fst bytes, descriptors).
        let mut cursor = 0usize;
        let (metadata, next) = Self::read_record::<PrismMetadata>(region.as_bytes(), cursor)?;
        cursor = next;
        let (fst_bytes, next) = Self::read_record::<Vec<u8>>(region.as_bytes(), cursor)?;
        cursor = next;
        let (descriptors, _) =
            Self::read_record::<Vec<Vec<SpellingDescriptor>>>(region.as_bytes(), cursor)?;

        if metadata.format != PRISM_FORMAT {
            return Err(CoreError::Format(format!(
                "unexpected prism format: {}",
                metadata.format
            )));
        }
        let map = Map::new(fst_bytes).map_err(|e| CoreError::Format(format!("fst map: {e}")))?;
        Ok(Self {
            metadata,
            map,
            descriptors,
        })
    }

    fn read_record<T: serde::de::DeserializeOwned>(
        buf: &[u8],
        offset: usize,
    ) -> CoreResult<(T, usize)> {
        if offset + 8 > buf.len() {
            return Err(CoreError::Format("truncated prism file".into()));
        }
        let len = u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap()) as usize;
        let start = offset + 8;
        let end = start + len;
        if end > buf.len() {
            return Err(CoreError::Format("truncated prism record".into()));
        }
        let value = bincode::deserialize(&buf[start..end])
            .map_err(|e| CoreError::Format(format!("bincode decode: {e}")))?;
        Ok((value, end))
    }
}
