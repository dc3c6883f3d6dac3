// Thin re-export module: implementation is in `transaction/types.rs` and
// `transaction/processing.rs` to keep the data model separate from the
// UTXO-processing engine.

pub mod processing;
pub mod types;

pub use types::*;
