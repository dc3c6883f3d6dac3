// Thin re-export module: implementation is in `blockchain/core.rs` to allow
// progressive decomposition of ledger responsibilities (chain management,
// registry state, whole-chain validation).

pub mod core;
pub use core::*;
