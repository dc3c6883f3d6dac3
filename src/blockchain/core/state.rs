use crate::transaction::TransactionOutput;
use secp256k1::PublicKey;
use std::collections::HashMap;

/// The single source of truth for "what can still be spent", plus the
/// monotonic counter that makes transaction ids unique.
///
/// The state is owned by the [`Blockchain`](crate::blockchain::Blockchain)
/// and handed to the transaction engine and validator by reference; there is
/// no ambient global registry. An id present in `utxos` is spendable exactly
/// once: consuming it removes the entry in the same processing step that adds
/// the outputs it funds.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct LedgerState {
    pub utxos: HashMap<String, TransactionOutput>,
    sequence: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments and returns the transaction sequence number. Called exactly
    /// once per processed transaction, so ids stay unique even for repeated
    /// `(sender, recipient, value)` triples.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Sum of all registry outputs owned by `key`.
    pub fn balance_of(&self, key: &PublicKey) -> u64 {
        self.utxos
            .values()
            .filter(|output| output.is_owned_by(key))
            .map(|output| output.value)
            .sum()
    }
}
