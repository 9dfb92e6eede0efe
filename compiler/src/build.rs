//! Build orchestration: the checksum-gated pipeline from dict sources to
//! `*.table.bin` / `*.prism.bin` / `*.reverse.bin`.
//!
//! Grounded in `entry_collector.cc`'s driving sequence plus the teacher's
//! `convert_table.rs` (for the "load sources, build artifacts, write to
//! disk" shape of a compile step); the checksum short-circuit and
//! artifact co-location come straight from spec.md §4.H.

use crate::encoder::ScriptEncoder;
use crate::entry_collector::{read_dict_file, EntryCollector};
use ime_core::model::{Code, DictEntry, SpellingType};
use ime_core::prism::{Prism, SpellingDescriptor};
use ime_core::reverse::ReverseDb;
use ime_core::table::Table;
use ime_core::{CoreError, CoreResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct BuildPaths {
    pub dict_files: Vec<PathBuf>,
    pub schema_file: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub stem: String,
}

impl BuildPaths {
    pub fn table_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.table.bin", self.stem))
    }

    pub fn prism_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.prism.bin", self.stem))
    }

    pub fn reverse_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.reverse.bin", self.stem))
    }
}

pub fn checksum_file(path: &Path) -> CoreResult<u32> {
    let bytes = std::fs::read(path).map_err(CoreError::Io)?;
    Ok(crc32fast::hash(&bytes))
}

fn combined_checksum(paths: &[PathBuf]) -> CoreResult<u32> {
    let mut hasher = crc32fast::Hasher::new();
    for path in paths {
        let bytes = std::fs::read(path).map_err(CoreError::Io)?;
        hasher.update(&bytes);
    }
    Ok(hasher.finalize())
}

/// Build (or skip, if checksums already match) the Table, Prism, and
/// ReverseDb for one schema's dict sources.
pub fn build(paths: &BuildPaths) -> CoreResult<()> {
    let dict_checksum = combined_checksum(&paths.dict_files)?;
    let schema_checksum = match &paths.schema_file {
        Some(p) => checksum_file(p)?,
        None => 0,
    };

    let mut collector = EntryCollector::new();
    for dict_file in &paths.dict_files {
        let source = read_dict_file(dict_file)?;
        collector.collect(&source)?;
    }
    let encoder = ScriptEncoder::new();
    let preset: Option<HashMap<String, f64>> = None;
    collector.finish(&encoder, preset.as_ref())?;

    let table_stale = needs_rebuild(&paths.table_path(), |t: &Table| {
        t.checksums_match(dict_checksum, schema_checksum)
    });
    if table_stale {
        build_table(&collector, dict_checksum, schema_checksum, &paths.table_path())?;
    } else {
        info!("table up to date, skipping: {}", paths.table_path().display());
    }

    let prism_stale = needs_rebuild(&paths.prism_path(), |p: &Prism| {
        p.checksums_match(dict_checksum, schema_checksum)
    });
    if prism_stale {
        build_prism(&collector, dict_checksum, schema_checksum, &paths.prism_path())?;
    } else {
        info!("prism up to date, skipping: {}", paths.prism_path().display());
    }

    let reverse_stale = needs_rebuild(&paths.reverse_path(), |r: &ReverseDb| r.checksums_match(dict_checksum));
    if reverse_stale {
        build_reverse(&collector, dict_checksum, &paths.reverse_path())?;
    } else {
        info!("reverse db up to date, skipping: {}", paths.reverse_path().display());
    }

    Ok(())
}

fn needs_rebuild<T, F>(path: &Path, checksums_match: F) -> bool
where
    F: Fn(&T) -> bool,
    T: Loadable,
{
    if !path.exists() {
        return true;
    }
    match T::load(path) {
        Ok(existing) => !checksums_match(&existing),
        Err(e) => {
            warn!("corrupt artifact at {}, rebuilding: {e}", path.display());
            true
        }
    }
}

trait Loadable: Sized {
    fn load(path: &Path) -> CoreResult<Self>;
}

impl Loadable for Table {
    fn load(path: &Path) -> CoreResult<Self> {
        Table::load(path)
    }
}

impl Loadable for Prism {
    fn load(path: &Path) -> CoreResult<Self> {
        Prism::load(path)
    }
}

impl Loadable for ReverseDb {
    fn load(path: &Path) -> CoreResult<Self> {
        ReverseDb::load(path)
    }
}

/// Interns syllable strings to dense ids (syllabary order) so [`Code`]
/// values can use `u32`s instead of repeating strings.
fn intern_syllabary(collector: &EntryCollector) -> BTreeMap<String, u32> {
    collector
        .syllabary
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), i as u32))
        .collect()
}

fn build_table(collector: &EntryCollector, dict_checksum: u32, schema_checksum: u32, path: &Path) -> CoreResult<()> {
    let syllable_ids = intern_syllabary(collector);
    let mut syllabary = vec![String::new(); syllable_ids.len()];
    for (syllable, id) in &syllable_ids {
        syllabary[*id as usize] = syllable.clone();
    }
    let mut entries: BTreeMap<Code, Vec<DictEntry>> = BTreeMap::new();
    for raw in &collector.entries {
        let Some(ids) = raw
            .raw_code
            .0
            .iter()
            .map(|s| syllable_ids.get(s).copied())
            .collect::<Option<Vec<u32>>>()
        else {
            warn!("entry '{}' references an unknown syllable, skipping", raw.text);
            continue;
        };
        let code = Code(ids);
        entries
            .entry(code.clone())
            .or_default()
            .push(DictEntry::new(raw.text.clone(), code, raw.weight));
    }
    let table = Table::build_with_syllabary(entries, syllabary, dict_checksum, schema_checksum);
    table.save(path)?;
    info!("wrote table: {}", path.display());
    Ok(())
}

fn build_prism(collector: &EntryCollector, dict_checksum: u32, schema_checksum: u32, path: &Path) -> CoreResult<()> {
    let syllable_ids = intern_syllabary(collector);
    let mut spellings: BTreeMap<String, Vec<SpellingDescriptor>> = BTreeMap::new();
    for (syllable, id) in &syllable_ids {
        spellings.insert(
            syllable.clone(),
            vec![SpellingDescriptor {
                syllable_id: *id,
                spelling_type: SpellingType::Normal,
                credibility: 0.0,
                tips: None,
            }],
        );
    }
    let prism = Prism::build(spellings, dict_checksum, schema_checksum)?;
    prism.save(path)?;
    info!("wrote prism: {}", path.display());
    Ok(())
}

fn build_reverse(collector: &EntryCollector, dict_checksum: u32, path: &Path) -> CoreResult<()> {
    let syllable_ids = intern_syllabary(collector);
    let mut index: BTreeMap<String, Vec<Code>> = BTreeMap::new();
    for raw in &collector.entries {
        let Some(ids) = raw
            .raw_code
            .0
            .iter()
            .map(|s| syllable_ids.get(s).copied())
            .collect::<Option<Vec<u32>>>()
        else {
            continue;
        };
        index.entry(raw.text.clone()).or_default().push(Code(ids));
    }
    let reverse = ReverseDb::build(index, dict_checksum);
    reverse.save(path)?;
    info!("wrote reverse db: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_dict(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "---\nname: test\ncolumns:\n  - text\n  - code\n  - weight\n---\n{body}"
        )
        .unwrap();
        path
    }

    #[test]
    fn build_writes_all_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let dict_path = write_dict(dir.path(), "test.dict.yaml", "你\tni\t10\n好\thao\t8\n");
        let paths = BuildPaths {
            dict_files: vec![dict_path],
            schema_file: None,
            out_dir: dir.path().to_path_buf(),
            stem: "test".to_string(),
        };
        build(&paths).unwrap();
        assert!(paths.table_path().exists());
        assert!(paths.prism_path().exists());
        assert!(paths.reverse_path().exists());

        let table = Table::load(paths.table_path()).unwrap();
        assert!(table.checksums_match(combined_checksum(&paths.dict_files).unwrap(), 0));
    }

    #[test]
    fn build_skips_when_checksum_matches() {
        let dir = tempfile::tempdir().unwrap();
        let dict_path = write_dict(dir.path(), "test.dict.yaml", "你\tni\t10\n");
        let paths = BuildPaths {
            dict_files: vec![dict_path.clone()],
            schema_file: None,
            out_dir: dir.path().to_path_buf(),
            stem: "test".to_string(),
        };
        build(&paths).unwrap();
        let table_mtime_before = std::fs::metadata(paths.table_path()).unwrap().modified().unwrap();
        build(&paths).unwrap();
        let table_mtime_after = std::fs::metadata(paths.table_path()).unwrap().modified().unwrap();
        assert_eq!(table_mtime_before, table_mtime_after);
    }
}
