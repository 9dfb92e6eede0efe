//! Entry collector: the three-pass pipeline that turns `*.dict.yaml`
//! source files into raw dictionary entries ready for encoding.
//!
//! Grounded directly in `entry_collector.cc`'s `Collect`/`CreateEntry`/
//! `Finish` methods: pass 1 reads explicit-code lines and learns the
//! syllabary and single-character words; pass 2 hands every word with no
//! explicit code to an [`crate::encoder::Encoder`]; pass 3 backfills from a
//! preset vocabulary. Column layout and the `# no comment` sentinel are
//! kept from the original; YAML front matter replaces the C++ version's
//! ad hoc header parser, matching this workspace's `serde_yaml` stack.

use ime_core::{CoreError, CoreResult, RawCode};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::io::BufRead;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct DictSettings {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// `"original"` preserves source order instead of sorting homophones
    /// by descending weight.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

fn default_version() -> String {
    "0".to_string()
}

fn default_columns() -> Vec<String> {
    vec!["text".to_string(), "code".to_string(), "weight".to_string()]
}

#[derive(Debug, Clone)]
pub struct RawDictEntry {
    pub text: String,
    pub raw_code: RawCode,
    pub weight: f64,
}

/// One dict source file: YAML front matter (fenced by `---` lines) plus a
/// tab-separated body.
pub struct DictSource {
    pub settings: DictSettings,
    pub rows: Vec<Vec<String>>,
}

impl DictSource {
    pub fn parse(content: &str) -> CoreResult<Self> {
        let mut lines = content.lines();
        let first = lines
            .next()
            .ok_or_else(|| CoreError::Format("empty dict source".into()))?;
        if first.trim() != "---" {
            return Err(CoreError::Format("missing dict settings header".into()));
        }
        let mut header = String::new();
        let mut body_start = None;
        for (i, line) in lines.clone().enumerate() {
            if line.trim() == "..." || line.trim() == "---" {
                body_start = Some(i + 1);
                break;
            }
            header.push_str(line);
            header.push('\n');
        }
        let body_start = body_start.ok_or_else(|| CoreError::Format("unterminated dict settings header".into()))?;
        let settings: DictSettings =
            serde_yaml::from_str(&header).map_err(|e| CoreError::Format(format!("dict settings: {e}")))?;

        let mut rows = Vec::new();
        let mut enable_comment = true;
        for line in content.lines().skip(1 + body_start) {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if enable_comment && line.starts_with('#') {
                if line == "# no comment" {
                    enable_comment = false;
                }
                continue;
            }
            rows.push(line.split('\t').map(str::to_string).collect());
        }
        Ok(Self { settings, rows })
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.settings.columns.iter().position(|c| c == name)
    }
}

pub struct EntryCollector {
    pub syllabary: BTreeSet<String>,
    pub entries: Vec<RawDictEntry>,
    /// text -> code string -> accumulated weight, for single-syllable words.
    pub words: HashMap<String, HashMap<String, f64>>,
    pub total_weight: HashMap<String, f64>,
    pub stems: HashMap<String, HashSet<String>>,
    encode_queue: VecDeque<(String, String)>,
    collection: HashSet<String>,
    num_entries: usize,
}

impl Default for EntryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryCollector {
    pub fn new() -> Self {
        Self {
            syllabary: BTreeSet::new(),
            entries: Vec::new(),
            words: HashMap::new(),
            total_weight: HashMap::new(),
            stems: HashMap::new(),
            encode_queue: VecDeque::new(),
            collection: HashSet::new(),
            num_entries: 0,
        }
    }

    /// Pass 1: read one dict source's body, learning syllables and
    /// single-character words, and queuing words with no explicit code.
    pub fn collect(&mut self, source: &DictSource) -> CoreResult<()> {
        let text_col = source
            .column_index("text")
            .ok_or_else(|| CoreError::Format("missing text column".into()))?;
        let code_col = source.column_index("code");
        let weight_col = source.column_index("weight");
        let stem_col = source.column_index("stem");

        for row in &source.rows {
            let Some(word) = row.get(text_col).filter(|s| !s.is_empty()) else {
                warn!("missing entry text at #{}", self.num_entries);
                continue;
            };
            let code_str = code_col.and_then(|c| row.get(c)).filter(|s| !s.is_empty());
            let weight_str = weight_col.and_then(|c| row.get(c)).filter(|s| !s.is_empty());
            let stem_str = stem_col.and_then(|c| row.get(c)).filter(|s| !s.is_empty());

            self.collection.insert(word.clone());
            match code_str {
                Some(code_str) => self.create_entry(word, code_str, weight_str.map(String::as_str))?,
                None => self.encode_queue.push_back((word.clone(), weight_str.cloned().unwrap_or_default())),
            }
            if let (Some(stem), Some(code_str)) = (stem_str, code_str) {
                debug!("add stem '{word}': [{code_str}] = [{stem}]");
                self.stems.entry(word.clone()).or_default().insert(stem.clone());
            }
        }
        debug!(
            "pass 1: {} entries collected, {} syllables, {} queued for encoding",
            self.num_entries,
            self.syllabary.len(),
            self.encode_queue.len()
        );
        Ok(())
    }

    fn create_entry(&mut self, word: &str, code_str: &str, weight_str: Option<&str>) -> CoreResult<()> {
        let raw_code = RawCode(code_str.split_whitespace().map(str::to_string).collect());
        let mut weight = parse_weight(weight_str, 0.0);
        if let Some(w) = weight_str {
            if w.ends_with('%') {
                let percentage: f64 = w.trim_end_matches('%').parse().unwrap_or(100.0);
                weight *= percentage / 100.0;
            }
        }

        for syllable in &raw_code.0 {
            self.syllabary.insert(syllable.clone());
        }

        if raw_code.0.len() == 1 {
            let by_code = self.words.entry(word.to_string()).or_default();
            if by_code.contains_key(code_str) {
                warn!("duplicate word definition '{word}': [{code_str}]");
                return Ok(());
            }
            *by_code.entry(code_str.to_string()).or_insert(0.0) += weight;
            *self.total_weight.entry(word.to_string()).or_insert(0.0) += weight;
        }

        self.entries.push(RawDictEntry {
            text: word.to_string(),
            raw_code,
            weight,
        });
        self.num_entries += 1;
        Ok(())
    }

    /// Pass 2 + 3: drain the encode queue through `encoder`, then backfill
    /// from `preset` for any word never seen in pass 1.
    pub fn finish(
        &mut self,
        encoder: &dyn crate::encoder::Encoder,
        preset: Option<&HashMap<String, f64>>,
    ) -> CoreResult<()> {
        let queued: Vec<(String, String)> = self.encode_queue.drain(..).collect();
        for (phrase, weight_str) in queued {
            match encoder.encode_phrase(self, &phrase, &weight_str) {
                Ok(codes) => {
                    for (code, weight) in codes {
                        self.push_encoded(phrase.clone(), code, weight);
                    }
                }
                Err(_) => warn!("encode failure: '{phrase}'"),
            }
        }
        debug!("pass 2: {} entries collected", self.num_entries);

        if let Some(preset) = preset {
            for (phrase, weight) in preset {
                if self.collection.contains(phrase) {
                    continue;
                }
                let weight_str = weight.to_string();
                match encoder.encode_phrase(self, phrase, &weight_str) {
                    Ok(codes) => {
                        for (code, w) in codes {
                            self.push_encoded(phrase.clone(), code, w);
                        }
                    }
                    Err(_) => warn!("encode failure: '{phrase}'"),
                }
            }
        }
        debug!("pass 3: {} entries collected", self.num_entries);
        Ok(())
    }

    /// Record a phrase the encoder produced a code for, mirroring
    /// `CreateEntry` but without re-learning syllables (the encoder only
    /// ever combines already-known syllables).
    pub fn push_encoded(&mut self, text: String, raw_code: RawCode, weight: f64) {
        self.entries.push(RawDictEntry { text, raw_code, weight });
        self.num_entries += 1;
    }

    /// Reverse-lookup helper used by the `ReverseDb` builder: stems win
    /// over single-character code candidates, and low-weight homophones
    /// (under 5% of the word's total weight) are dropped.
    pub fn translate_word(&self, word: &str) -> Vec<String> {
        if let Some(stems) = self.stems.get(word) {
            return stems.iter().cloned().collect();
        }
        if let Some(by_code) = self.words.get(word) {
            let total = self.total_weight.get(word).copied().unwrap_or(0.0);
            let min_weight = total * 0.05;
            return by_code
                .iter()
                .filter(|(_, w)| **w >= min_weight)
                .map(|(code, _)| code.clone())
                .collect();
        }
        Vec::new()
    }
}

fn parse_weight(weight_str: Option<&str>, default: f64) -> f64 {
    match weight_str {
        None => default,
        Some(s) if s.ends_with('%') => default,
        Some(s) => s.parse().unwrap_or(default),
    }
}

pub fn read_dict_file(path: &std::path::Path) -> CoreResult<DictSource> {
    let content = std::fs::read_to_string(path).map_err(CoreError::Io)?;
    DictSource::parse(&content)
}

#[allow(dead_code)]
fn count_lines(reader: impl BufRead) -> usize {
    reader.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ScriptEncoder;

    fn sample_source() -> DictSource {
        DictSource::parse(
            "---\nname: test\ncolumns:\n  - text\n  - code\n  - weight\n---\n你\tni\t10\n好\thao\t8\n你好\t\t\n",
        )
        .unwrap()
    }

    #[test]
    fn collect_learns_syllabary_and_single_char_words() {
        let mut collector = EntryCollector::new();
        collector.collect(&sample_source()).unwrap();
        assert!(collector.syllabary.contains("ni"));
        assert!(collector.syllabary.contains("hao"));
        assert_eq!(collector.words["你"]["ni"], 10.0);
    }

    #[test]
    fn finish_encodes_queued_phrase() {
        let mut collector = EntryCollector::new();
        collector.collect(&sample_source()).unwrap();
        let encoder = ScriptEncoder::new();
        collector.finish(&encoder, None).unwrap();
        assert!(collector.entries.iter().any(|e| e.text == "你好"));
    }

    #[test]
    fn translate_word_prefers_stems_over_codes() {
        let mut collector = EntryCollector::new();
        collector.stems.insert("你".into(), HashSet::from(["nii".to_string()]));
        collector.words.insert("你".into(), HashMap::from([("ni".to_string(), 10.0)]));
        collector.total_weight.insert("你".into(), 10.0);
        assert_eq!(collector.translate_word("你"), vec!["nii".to_string()]);
    }
}
