//! ime-core
//!
//! Engine core for a schema-configurable input method: a mapped-file
//! spelling index (Prism) and phrase table, a decayed-frequency user
//! dictionary, syllabification with typo correction, and the
//! processor/segmentor/translator/filter pipeline that turns key events
//! into committed text.
//!
//! Public API re-exports the pieces a host (or the `compiler` crate) needs
//! to assemble a running session: `Prism`/`Table`/`ReverseDb` as the
//! compiled, read-only dictionary artifacts; `UserDb`/`UserDictionary` as
//! the mutable learned layer; `Engine`/`Service` as the session-facing
//! entry points; `Context`/`Composition`/`Candidate` as the state a host
//! renders.

pub mod error;
pub use error::{CoreError, CoreResult};

pub mod model;
pub use model::{Code, DictEntry, RawCode, SpellingProperties, SpellingType, SyllableId};

pub mod mapped;
pub use mapped::MappedRegion;

pub mod prism;
pub use prism::{Prism, SpellingDescriptor};

pub mod corrector;
pub use corrector::Corrector;

pub mod syllabifier;
pub use syllabifier::{SyllableGraph, Syllabifier};

pub mod table;
pub use table::Table;

pub mod reverse;
pub use reverse::ReverseDb;

pub mod userdb;
pub use userdb::UserDb;

pub mod user_dictionary;
pub use user_dictionary::UserDictionary;

pub mod dictionary;
pub use dictionary::Dictionary;

pub mod composition;
pub use composition::{Composition, Segment, SegmentStatus};

pub mod context;
pub use context::{Context, ContextEvent, InputPurpose};

pub mod candidate;
pub use candidate::{Candidate, CandidateKind, CandidateList};

pub mod pipeline;
pub use pipeline::{Engine, EngineKeyResult, KeyEvent, ProcessResult};

pub mod switcher;
pub use switcher::{Switcher, SwitcherAction};

pub mod service;
pub use service::{ResourceResolver, Service, Session, SessionId};

pub mod speller;
pub use speller::{Speller, SpellerConfig};

pub mod selector;
pub use selector::{Selector, SelectorConfig};

pub mod editor;
pub use editor::{CharHandling, EditorAction, EditorBindings};

pub mod keybinder;
pub use keybinder::{BindingAction, BindingContext, KeyBinder, KeyBinding, When};

pub mod config;
pub use config::ConfigGraph;

pub mod levers;
pub use levers::Levers;

/// Normalization and text-width helpers shared across the pipeline
/// (spelling input normalization, punctuation width conversion).
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Convert ASCII characters to full-width equivalents.
    pub fn to_fullwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                ' ' => '\u{3000}',
                '!'..='~' => {
                    let code = ch as u32;
                    char::from_u32(code - 0x21 + 0xFF01).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }

    /// Convert full-width characters back to ASCII (half-width).
    pub fn to_halfwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{3000}' => ' ',
                '\u{FF01}'..='\u{FF5E}' => {
                    let code = ch as u32;
                    char::from_u32(code - 0xFF01 + 0x21).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }
}
