//! Dict compiler: turns schema-declared dict sources into the compiled
//! artifacts `ime-core` loads at runtime (`Table`, `Prism`, `ReverseDb`),
//! plus the spelling-algebra calculus and the CLI binaries in `src/bin`.

pub mod build;
pub mod calculus;
pub mod encoder;
pub mod entry_collector;
