//! Levers: the deployment-time settings surface spec.md §6.1 lists
//! alongside the C ABI (custom settings get/set, switcher settings,
//! user-dict iterate/backup/restore/import/export), narrowed to a plain
//! Rust API over a [`crate::service::ResourceResolver`].
//!
//! No teacher analog exists for this surface; custom settings persistence
//! follows the teacher's `Config` + `toml` load/save convention
//! (`core/src/lib.rs`'s `Config::load`/`Config::save`) rather than inventing
//! a new serialization story.

use crate::error::{CoreError, CoreResult};
use crate::service::ResourceResolver;
use crate::userdb::UserDb;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reads and writes a schema's custom settings file
/// (`<schema_id>.custom.toml` under the user data directory) and exposes
/// the user-dict maintenance operations a deployment host drives outside
/// of normal session traffic.
pub struct Levers {
    resolver: ResourceResolver,
}

impl Levers {
    pub fn new(resolver: ResourceResolver) -> Self {
        Self { resolver }
    }

    fn custom_settings_path(&self, schema_id: &str) -> PathBuf {
        self.resolver.resolve(&format!("{schema_id}.custom.toml"))
    }

    /// Where a new or updated custom settings file should be written: the
    /// user data directory when one is configured, since custom settings
    /// are per-user overrides and must never land in shared/read-only data.
    fn custom_settings_write_path(&self, schema_id: &str) -> PathBuf {
        let dir = self.resolver.user_data_dir.as_deref().unwrap_or(&self.resolver.shared_data_dir);
        dir.join(format!("{schema_id}.custom.toml"))
    }

    /// Read one named setting out of a schema's custom settings file.
    /// Returns `Ok(None)` both when the file is absent and when the key is
    /// absent, since an unset custom setting falls back to the schema
    /// default rather than being an error.
    pub fn get_custom_setting<T: DeserializeOwned>(&self, schema_id: &str, key: &str) -> CoreResult<Option<T>> {
        let path = self.custom_settings_path(schema_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(CoreError::Io)?;
        let table: toml::Value = toml::from_str(&content).map_err(|e| CoreError::Format(format!("custom settings: {e}")))?;
        match table.get(key) {
            Some(value) => {
                let parsed = value
                    .clone()
                    .try_into()
                    .map_err(|e| CoreError::Format(format!("custom setting '{key}': {e}")))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Write one named setting into a schema's custom settings file,
    /// creating it (and merging with its existing contents) if needed.
    pub fn set_custom_setting<T: Serialize>(&self, schema_id: &str, key: &str, value: T) -> CoreResult<()> {
        let path = self.custom_settings_write_path(schema_id);
        let mut table: BTreeMap<String, toml::Value> = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(CoreError::Io)?;
            toml::from_str(&content).map_err(|e| CoreError::Format(format!("custom settings: {e}")))?
        } else {
            BTreeMap::new()
        };
        let serialized =
            toml::Value::try_from(value).map_err(|e| CoreError::Format(format!("custom setting '{key}': {e}")))?;
        table.insert(key.to_string(), serialized);
        let content = toml::to_string_pretty(&table).map_err(|e| CoreError::Format(format!("custom settings: {e}")))?;
        std::fs::write(&path, content).map_err(CoreError::Io)
    }

    pub fn backup_user_db(&self, db: &UserDb, dest: impl AsRef<std::path::Path>) -> CoreResult<()> {
        db.backup(dest)
    }

    pub fn restore_user_db(&self, db: &UserDb, src: impl AsRef<std::path::Path>) -> CoreResult<()> {
        db.restore(src)
    }

    /// List every entry whose key starts with `prefix` (an empty prefix
    /// lists the whole db), for a host's "export user dictionary" command.
    pub fn iterate_user_db(&self, db: &UserDb, prefix: &str) -> CoreResult<Vec<(String, Vec<u8>)>> {
        db.prefix_scan(prefix)
    }

    /// Export the db to a plain `key\tvalue` text file, matching spec.md
    /// §6.2's user-db snapshot shape closely enough for a host to re-import.
    pub fn export_user_db(&self, db: &UserDb, dest: impl AsRef<std::path::Path>) -> CoreResult<()> {
        let entries = self.iterate_user_db(db, "")?;
        let mut content = String::new();
        for (key, value) in entries {
            content.push_str(&key);
            content.push('\t');
            content.push_str(&String::from_utf8_lossy(&value));
            content.push('\n');
        }
        std::fs::write(dest, content).map_err(CoreError::Io)
    }

    /// Import a plain `key\tvalue` text file written by [`Self::export_user_db`].
    pub fn import_user_db(&self, db: &UserDb, src: impl AsRef<std::path::Path>) -> CoreResult<usize> {
        let content = std::fs::read_to_string(src).map_err(CoreError::Io)?;
        let mut count = 0;
        for line in content.lines() {
            let Some((key, value)) = line.split_once('\t') else {
                continue;
            };
            db.put(key, value.as_bytes())?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_levers() -> (Levers, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ResourceResolver {
            user_data_dir: Some(dir.path().to_path_buf()),
            shared_data_dir: dir.path().to_path_buf(),
        };
        (Levers::new(resolver), dir)
    }

    #[test]
    fn custom_setting_round_trips() {
        let (levers, _dir) = sample_levers();
        levers.set_custom_setting("pinyin_simp", "page_size", 7u32).unwrap();
        let value: Option<u32> = levers.get_custom_setting("pinyin_simp", "page_size").unwrap();
        assert_eq!(value, Some(7));
    }

    #[test]
    fn missing_custom_setting_file_returns_none() {
        let (levers, _dir) = sample_levers();
        let value: Option<u32> = levers.get_custom_setting("missing_schema", "page_size").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn export_then_import_user_db_round_trips() {
        let (levers, dir) = sample_levers();
        let db = UserDb::open(dir.path().join("user.db")).unwrap();
        db.put("ni hao ", "你好".as_bytes()).unwrap();

        let export_path = dir.path().join("export.txt");
        levers.export_user_db(&db, &export_path).unwrap();

        let restored = UserDb::open(dir.path().join("restored.db")).unwrap();
        let count = levers.import_user_db(&restored, &export_path).unwrap();
        assert_eq!(count, 1);
        assert_eq!(restored.get("ni hao ").unwrap().unwrap(), "你好".as_bytes());
    }
}
