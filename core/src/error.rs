//! Error kinds for the engine core.
//!
//! Mirrors the error taxonomy the design calls for: nothing here is thrown
//! for an *expected* failure. Callers get a `Result` and decide what to do;
//! the session always keeps running with the most recently valid state.

use thiserror::Error;

/// The six error kinds the core ever reports.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller supplied an out-of-range index, bad session id, or malformed
    /// key sequence. No state changes as a result.
    #[error("input error: {0}")]
    Input(String),

    /// A mapped file failed header validation. The affected component stays
    /// unloaded; previous state (if any) is untouched.
    #[error("format error: {0}")]
    Format(String),

    /// mmap/read/write/truncate failed at the OS level.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Formula parse, regex compile, or malformed YAML during compilation.
    /// The offending rule or entry is skipped; compilation continues.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A mapped-file region could not grow further.
    #[error("capacity error: {0}")]
    Capacity(String),

    /// A translator's backing dictionary is missing or a reverse lookup
    /// came up empty. Produces an empty translation, not a hard failure.
    #[error("domain error: {0}")]
    Domain(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
