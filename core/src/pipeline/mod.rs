//! The processor/segmentor/translator/filter pipeline, orchestrated by
//! [`engine::Engine`].
//!
//! Grounded in the teacher's `ImeEngine` (`ime_engine.rs`): one struct
//! owning a `Context` plus the pluggable stages, a `process_key` entry
//! point returning a handled/not-handled result, and an `Engine::new`
//! constructor taking the compiled dictionary resources. The teacher's
//! single `PhoneticEditor` stage is split into the four named stages
//! spec.md calls for, each independently swappable.

pub mod filter;
pub mod processor;
pub mod segmentor;
pub mod translator;

pub mod engine;
pub use engine::{Engine, EngineKeyResult};
pub use processor::{KeyEvent, ProcessResult};
