//! UserDictionary: decayed-frequency scoring over [`crate::userdb::UserDb`].
//!
//! The frequency-decay idea itself has no teacher analog (the teacher's
//! `UserDict` stores raw monotonic counts, see `learn`/`learn_with_count` in
//! `userdict.rs`); this module keeps that same "read current, add delta,
//! write back" transaction shape but replaces the stored value with a
//! `(commits, last_tick)` pair and computes a time-decayed score on read,
//! the way librime's dictionary weighs older commits less than fresh ones.

use crate::error::CoreResult;
use crate::model::{Code, DictEntry, SyllableId};
use crate::userdb::UserDb;
use serde::{Deserialize, Serialize};

/// Half-life, in ticks, after which a commit's weight contribution halves.
const DECAY_HALF_LIFE: f64 = 100.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct UserEntryRecord {
    commits: i32,
    last_tick: u64,
    dee: f64,
}

impl UserEntryRecord {
    fn new(tick: u64) -> Self {
        Self {
            commits: 0,
            last_tick: tick,
            dee: 0.0,
        }
    }

    /// `φ(commits / tick_now, tick_now, decayed_dee)`: blend the raw commit
    /// rate with an exponentially decayed credibility accumulator.
    fn score(&self, tick_now: u64) -> f64 {
        let elapsed = tick_now.saturating_sub(self.last_tick) as f64;
        let decay = 0.5_f64.powf(elapsed / DECAY_HALF_LIFE);
        let rate = if tick_now == 0 {
            0.0
        } else {
            self.commits as f64 / tick_now as f64
        };
        rate + self.dee * decay
    }
}

fn code_key(code: &Code, text: &str) -> String {
    let code_str = code
        .0
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{code_str}\0{text}")
}

pub struct UserDictionary {
    db: UserDb,
    auto_backup_every: u32,
    commits_since_backup: u32,
}

impl UserDictionary {
    pub fn new(db: UserDb, auto_backup_every: u32) -> Self {
        Self {
            db,
            auto_backup_every,
            commits_since_backup: 0,
        }
    }

    fn tick_now(&self) -> CoreResult<u64> {
        Ok(self
            .db
            .get_metadata("tick")?
            .map(|b| u64::from_le_bytes(b.try_into().unwrap_or([0; 8])))
            .unwrap_or(0))
    }

    fn advance_tick(&self) -> CoreResult<u64> {
        let next = self.tick_now()? + 1;
        self.db.put_metadata("tick", &next.to_le_bytes())?;
        Ok(next)
    }

    /// Revive (or create) an entry, incrementing its commit count and
    /// crediting the decay accumulator at the current tick.
    pub fn update(&mut self, code: &Code, text: &str, delta: i32) -> CoreResult<()> {
        let tick = self.advance_tick()?;
        let key = code_key(code, text);
        let mut record = self
            .db
            .get(&key)?
            .and_then(|b| bincode::deserialize::<UserEntryRecord>(&b).ok())
            .unwrap_or_else(|| UserEntryRecord::new(tick));

        let elapsed = tick.saturating_sub(record.last_tick) as f64;
        record.dee *= 0.5_f64.powf(elapsed / DECAY_HALF_LIFE);
        record.dee += delta as f64;
        record.commits += delta;
        record.last_tick = tick;

        if record.commits <= 0 {
            self.db.erase(&key)?;
        } else {
            let encoded = bincode::serialize(&record)
                .map_err(|e| crate::error::CoreError::Encoding(e.to_string()))?;
            self.db.put(&key, &encoded)?;
        }

        self.commits_since_backup += 1;
        if self.auto_backup_every > 0 && self.commits_since_backup >= self.auto_backup_every {
            self.commits_since_backup = 0;
            let mut backup_path = std::env::temp_dir();
            backup_path.push("ime_core_userdb.bak");
            let _ = self.db.backup(backup_path);
        }
        Ok(())
    }

    pub fn erase(&mut self, code: &Code, text: &str) -> CoreResult<()> {
        self.db.erase(&code_key(code, text))
    }

    /// Score every learned entry whose code prefix matches `prefix`.
    pub fn lookup(&self, prefix: &[SyllableId]) -> CoreResult<Vec<DictEntry>> {
        let tick = self.tick_now()?;
        let prefix_str = prefix
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut out = Vec::new();
        for (key, value) in self.db.prefix_scan(&prefix_str)? {
            let Some((code_part, text)) = key.split_once('\0') else {
                continue;
            };
            let code: Vec<SyllableId> = if code_part.is_empty() {
                Vec::new()
            } else {
                code_part.split(',').filter_map(|s| s.parse().ok()).collect()
            };
            let Ok(record) = bincode::deserialize::<UserEntryRecord>(&value) else {
                continue;
            };
            let mut entry = DictEntry::new(text, Code(code), record.score(tick));
            entry.commit_count = record.commits;
            out.push(entry);
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dict() -> UserDictionary {
        let mut tmp = std::env::temp_dir();
        tmp.push(format!(
            "ime_core_user_dictionary_test_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        UserDictionary::new(UserDb::open(&tmp).unwrap(), 0)
    }

    #[test]
    fn commit_then_lookup_finds_entry() {
        let mut dict = temp_dict();
        dict.update(&Code(vec![1, 2]), "你好", 1).unwrap();
        let hits = dict.lookup(&[1, 2]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "你好");
        assert_eq!(hits[0].commit_count, 1);
    }

    #[test]
    fn negative_delta_below_zero_erases_entry() {
        let mut dict = temp_dict();
        dict.update(&Code(vec![1]), "你", 1).unwrap();
        dict.update(&Code(vec![1]), "你", -1).unwrap();
        assert!(dict.lookup(&[1]).unwrap().is_empty());
    }

    #[test]
    fn repeated_commits_raise_score() {
        let mut dict = temp_dict();
        dict.update(&Code(vec![1]), "你", 1).unwrap();
        let first = dict.lookup(&[1]).unwrap()[0].weight;
        dict.update(&Code(vec![1]), "你", 1).unwrap();
        let second = dict.lookup(&[1]).unwrap()[0].weight;
        assert!(second >= first);
    }
}
