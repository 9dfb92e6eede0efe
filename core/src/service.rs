//! Service: multiplexes sessions over one set of shared compiled
//! resources (prism, table, user dictionary), the way a single running
//! IME process serves every connected input client.
//!
//! Grounded in the teacher's `ImeSession` (`session.rs`) for what a
//! session owns (input state, composition, candidate menu) but reshaped
//! into a `Service` keyed by session id, since `ImeSession` itself assumed
//! one session per process. `pipeline::Engine` borrows its dictionary
//! resources for the lifetime of one call rather than owning them across a
//! stored-session map, so `Service` holds them as `Arc`s and re-derives a
//! transient `Engine` per `process_key` call instead of storing one long
//! lived per session.

use crate::candidate::CandidateList;
use crate::context::Context;
use crate::pipeline::engine::{Engine, EngineKeyResult};
use crate::pipeline::processor::KeyEvent;
use crate::prism::Prism;
use crate::table::Table;
use crate::user_dictionary::UserDictionary;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type SessionId = u64;

pub struct Session {
    pub context: Context,
    pub menu: CandidateList,
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            context: Context::new(),
            menu: CandidateList::new(),
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Resources a `Service` resolves a session against. `user_data_dir`, when
/// present, takes precedence over `shared_data_dir` for any schema or user
/// dictionary file the session needs, mirroring librime's per-user override
/// of shared deployment data.
pub struct ResourceResolver {
    pub user_data_dir: Option<std::path::PathBuf>,
    pub shared_data_dir: std::path::PathBuf,
}

impl ResourceResolver {
    pub fn resolve(&self, relative: &str) -> std::path::PathBuf {
        if let Some(dir) = &self.user_data_dir {
            let candidate = dir.join(relative);
            if candidate.exists() {
                return candidate;
            }
        }
        self.shared_data_dir.join(relative)
    }
}

pub struct Service {
    prism: Arc<Prism>,
    table: Arc<Table>,
    user_dict: Option<Arc<UserDictionary>>,
    delimiters: Vec<char>,
    sessions: HashMap<SessionId, Session>,
    next_id: SessionId,
}

impl Service {
    pub fn new(prism: Arc<Prism>, table: Arc<Table>, user_dict: Option<Arc<UserDictionary>>, delimiters: Vec<char>) -> Self {
        Self {
            prism,
            table,
            user_dict,
            delimiters,
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn create_session(&mut self) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, Session::new());
        id
    }

    pub fn get_session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn destroy_session(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn cleanup_stale_sessions(&mut self, max_idle: Duration) {
        let now = Instant::now();
        self.sessions
            .retain(|_, session| now.duration_since(session.last_active) < max_idle);
    }

    pub fn cleanup_all_sessions(&mut self) {
        self.sessions.clear();
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn process_key(&mut self, id: SessionId, event: KeyEvent) -> Option<EngineKeyResult> {
        let session = self.sessions.get_mut(&id)?;
        session.touch();

        let mut engine = Engine::new(
            &self.prism,
            &self.delimiters,
            &self.table,
            self.user_dict.as_deref(),
        );
        *engine.context_mut() = std::mem::replace(&mut session.context, Context::new());

        let result = engine.process_key(event);

        session.context = std::mem::replace(engine.context_mut(), Context::new());
        session.menu = engine.menu().clone();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, DictEntry, SpellingType};
    use crate::prism::SpellingDescriptor;
    use std::collections::BTreeMap;

    fn sample_service() -> Service {
        let mut pm = BTreeMap::new();
        pm.insert(
            "ni".to_string(),
            vec![SpellingDescriptor {
                syllable_id: 1,
                spelling_type: SpellingType::Normal,
                credibility: 0.0,
                tips: None,
            }],
        );
        let prism = Arc::new(Prism::build(pm, 0, 0).unwrap());
        let mut tm = BTreeMap::new();
        tm.insert(Code(vec![1]), vec![DictEntry::new("你", Code(vec![1]), 10.0)]);
        let table = Arc::new(Table::build(tm, 0, 0));
        Service::new(prism, table, None, vec![])
    }

    #[test]
    fn create_process_and_destroy_session() {
        let mut service = sample_service();
        let id = service.create_session();
        assert_eq!(service.session_count(), 1);

        service.process_key(id, KeyEvent::Char('n'));
        service.process_key(id, KeyEvent::Char('i'));
        assert_eq!(service.get_session(id).unwrap().menu.candidates()[0].text, "你");

        assert!(service.destroy_session(id));
        assert_eq!(service.session_count(), 0);
    }

    #[test]
    fn cleanup_stale_sessions_removes_idle_ones() {
        let mut service = sample_service();
        let id = service.create_session();
        service.cleanup_stale_sessions(Duration::from_secs(0));
        assert_eq!(service.session_count(), 0);
        let _ = id;
    }
}
