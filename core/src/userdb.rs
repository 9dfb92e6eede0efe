//! UserDb: a transactional key/value store for user-learned entries.
//!
//! Grounded directly in the teacher's `userdict::UserDict` — same `redb`
//! database, same create/open convention, same read-then-write transaction
//! shape for increment-style updates. Generalized from UserDict's two fixed
//! tables (phrase frequency, bigram counts) into a single namespaced
//! key/value table so [`crate::user_dictionary::UserDictionary`] can store
//! arbitrary code/text keys, and given an explicit backup/restore pair the
//! teacher's UserDict never needed (file-copy semantics over `redb`, same
//! idea as its `Database::create` bootstrap).

use crate::error::{CoreError, CoreResult};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MAIN_TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("user_db");

/// A leading byte distinguishing metadata keys (tick counters, schema
/// fingerprints) from ordinary entry keys within the same table.
const METADATA_PREFIX: u8 = 0x01;

fn namespaced(key: &str) -> String {
    format!("{}{}", METADATA_PREFIX as char, key)
}

#[derive(Clone)]
pub struct UserDb {
    db: Arc<Database>,
    path: PathBuf,
}

impl UserDb {
    pub fn open<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        if let Some(dir) = path.as_ref().parent() {
            std::fs::create_dir_all(dir)?;
        }
        let db = Database::create(path.as_ref())
            .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        Ok(Self {
            db: Arc::new(db),
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        let r = self.db.begin_read().map_err(db_err)?;
        match r.open_table(MAIN_TABLE) {
            Ok(table) => Ok(table.get(key).map_err(db_err)?.map(|v| v.value().to_vec())),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    pub fn put(&self, key: &str, value: &[u8]) -> CoreResult<()> {
        let w = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = w.open_table(MAIN_TABLE).map_err(db_err)?;
            table.insert(key, value).map_err(db_err)?;
        }
        w.commit().map_err(db_err)?;
        Ok(())
    }

    pub fn erase(&self, key: &str) -> CoreResult<()> {
        let w = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = w.open_table(MAIN_TABLE).map_err(db_err)?;
            table.remove(key).map_err(db_err)?;
        }
        w.commit().map_err(db_err)?;
        Ok(())
    }

    /// List every entry key whose bytes start with `prefix`, excluding
    /// namespaced metadata keys.
    pub fn prefix_scan(&self, prefix: &str) -> CoreResult<Vec<(String, Vec<u8>)>> {
        let mut out = Vec::new();
        let r = self.db.begin_read().map_err(db_err)?;
        match r.open_table(MAIN_TABLE) {
            Ok(table) => {
                for item in table.iter().map_err(db_err)? {
                    let (k, v) = item.map_err(db_err)?;
                    let key = k.value();
                    if key.starts_with(&(METADATA_PREFIX as char).to_string()) {
                        continue;
                    }
                    if key.starts_with(prefix) {
                        out.push((key.to_string(), v.value().to_vec()));
                    }
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(db_err(e)),
        }
        Ok(out)
    }

    pub fn get_metadata(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        self.get(&namespaced(key))
    }

    pub fn put_metadata(&self, key: &str, value: &[u8]) -> CoreResult<()> {
        self.put(&namespaced(key), value)
    }

    /// Back up the database file to `dest` (a point-in-time file copy; the
    /// teacher opens a fresh `Database::create` per path, so a copy of the
    /// closed-form file is a faithful snapshot between transactions).
    pub fn backup<P: AsRef<Path>>(&self, dest: P) -> CoreResult<()> {
        std::fs::copy(&self.path, dest)?;
        Ok(())
    }

    /// Restore from a previously-made backup file, replacing this db's
    /// on-disk contents. Caller must reopen a fresh `UserDb` afterward since
    /// the live `redb::Database` handle cannot be swapped in place.
    pub fn restore<P: AsRef<Path>>(&self, src: P) -> CoreResult<()> {
        std::fs::copy(src, &self.path)?;
        Ok(())
    }
}

fn db_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> UserDb {
        let mut tmp = std::env::temp_dir();
        tmp.push(format!(
            "ime_core_userdb_test_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        UserDb::open(&tmp).unwrap()
    }

    #[test]
    fn put_get_erase_roundtrip() {
        let db = temp_db();
        db.put("ni2hao3", b"payload").unwrap();
        assert_eq!(db.get("ni2hao3").unwrap().unwrap(), b"payload");
        db.erase("ni2hao3").unwrap();
        assert!(db.get("ni2hao3").unwrap().is_none());
    }

    #[test]
    fn metadata_keys_are_excluded_from_prefix_scan() {
        let db = temp_db();
        db.put("ni2hao3", b"x").unwrap();
        db.put_metadata("tick", b"42").unwrap();
        let hits = db.prefix_scan("ni2").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(db.get_metadata("tick").unwrap().unwrap(), b"42");
    }

    #[test]
    fn backup_and_restore_roundtrip() {
        let db = temp_db();
        db.put("a", b"1").unwrap();
        let mut backup_path = std::env::temp_dir();
        backup_path.push(format!(
            "ime_core_userdb_backup_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        db.backup(&backup_path).unwrap();
        db.put("a", b"2").unwrap();
        db.restore(&backup_path).unwrap();
        let path = db.path.clone();
        drop(db);
        let reopened = UserDb::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap().unwrap(), b"1");
    }
}
