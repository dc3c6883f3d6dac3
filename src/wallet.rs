//! Wallet operations: key ownership, balance scanning, and coin selection.

use crate::blockchain::LedgerState;
use crate::crypto::{public_key_hex, KeyPair};
use crate::error::ChainError;
use crate::transaction::{Transaction, TransactionInput, TransactionOutput};
use secp256k1::PublicKey;
use std::collections::HashMap;
use tracing::warn;

/// A key pair plus a locally cached view of the registry entries the key can
/// claim. The cache is filtered and possibly stale; [`Wallet::balance`]
/// refreshes it from the registry.
pub struct Wallet {
    keypair: KeyPair,
    pub utxos: HashMap<String, TransactionOutput>,
}

impl Wallet {
    /// Creates a wallet with a freshly generated key pair.
    pub fn new() -> Result<Self, ChainError> {
        Ok(Wallet {
            keypair: KeyPair::generate()?,
            utxos: HashMap::new(),
        })
    }

    pub fn from_keypair(keypair: KeyPair) -> Self {
        Wallet {
            keypair,
            utxos: HashMap::new(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key
    }

    /// Scans the full registry, sums every output owned by this wallet's
    /// key, and refreshes the local cache as a side effect.
    pub fn balance(&mut self, state: &LedgerState) -> u64 {
        let mut total = 0u64;
        for output in state.utxos.values() {
            if output.is_owned_by(&self.keypair.public_key) {
                self.utxos.insert(output.id.clone(), output.clone());
                total += output.value;
            }
        }
        total
    }

    /// Builds and signs a transfer of `value` coins to `recipient`.
    ///
    /// Coin selection is a greedy walk over the cached outputs, collecting
    /// each as an input until the running total exceeds `value`; no attempt
    /// is made to minimize the input set. The consumed ids are evicted from
    /// the cache immediately, before the transaction has been accepted onto
    /// the chain, so the cache can diverge from the registry if the
    /// transaction is later rejected.
    pub fn send_funds(
        &mut self,
        recipient: &PublicKey,
        value: u64,
        state: &LedgerState,
    ) -> Result<Transaction, ChainError> {
        let balance = self.balance(state);
        if balance < value {
            warn!(
                "Wallet {} has {} coins, cannot send {}",
                public_key_hex(&self.keypair.public_key),
                balance,
                value
            );
            return Err(ChainError::InsufficientFunds(format!(
                "Balance {} is below requested amount {}",
                balance, value
            )));
        }

        let mut inputs: Vec<TransactionInput> = Vec::new();
        let mut total = 0u64;
        for output in self.utxos.values() {
            total += output.value;
            inputs.push(TransactionInput::new(output.id.clone()));
            if total > value {
                break;
            }
        }

        let mut transaction =
            Transaction::new(self.keypair.public_key, *recipient, value, inputs);
        transaction.sign(&self.keypair)?;

        for input in &transaction.inputs {
            self.utxos.remove(&input.output_id);
        }

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{OutputRole, GENESIS_TRANSACTION_ID};

    fn state_with_output(owner: &PublicKey, value: u64) -> LedgerState {
        let mut state = LedgerState::new();
        let output = TransactionOutput::new(
            *owner,
            value,
            GENESIS_TRANSACTION_ID.to_string(),
            OutputRole::Payment,
        );
        state.utxos.insert(output.id.clone(), output);
        state
    }

    #[test]
    fn test_balance_scans_registry_and_fills_cache() {
        let mut wallet = Wallet::new().unwrap();
        let other = Wallet::new().unwrap();

        let mut state = state_with_output(&wallet.public_key(), 100);
        let foreign = TransactionOutput::new(
            other.public_key(),
            50,
            GENESIS_TRANSACTION_ID.to_string(),
            OutputRole::Payment,
        );
        state.utxos.insert(foreign.id.clone(), foreign);

        assert!(wallet.utxos.is_empty());
        assert_eq!(wallet.balance(&state), 100);
        assert_eq!(wallet.utxos.len(), 1);
    }

    #[test]
    fn test_send_funds_builds_signed_transaction() {
        let mut wallet = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap();
        let state = state_with_output(&wallet.public_key(), 100);

        let tx = wallet
            .send_funds(&recipient.public_key(), 65, &state)
            .unwrap();
        assert_eq!(tx.value, 65);
        assert_eq!(tx.sender, wallet.public_key());
        assert_eq!(tx.recipient, recipient.public_key());
        assert_eq!(tx.inputs.len(), 1);
        tx.verify_signature().unwrap();
    }

    #[test]
    fn test_send_funds_refuses_overdraft() {
        let mut wallet = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap();
        let state = state_with_output(&wallet.public_key(), 100);

        let err = wallet
            .send_funds(&recipient.public_key(), 1000, &state)
            .unwrap_err();
        assert!(matches!(err, ChainError::InsufficientFunds(_)));
        // The cache keeps its outputs; nothing was consumed.
        assert_eq!(wallet.utxos.len(), 1);
    }

    #[test]
    fn test_send_funds_evicts_consumed_outputs_optimistically() {
        let mut wallet = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap();
        let state = state_with_output(&wallet.public_key(), 100);

        let tx = wallet
            .send_funds(&recipient.public_key(), 65, &state)
            .unwrap();
        // Evicted before the transaction was accepted anywhere.
        for input in &tx.inputs {
            assert!(!wallet.utxos.contains_key(&input.output_id));
        }
    }

    #[test]
    fn test_greedy_selection_stops_past_requested_value() {
        let mut wallet = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap();

        let mut state = LedgerState::new();
        for value in [40u64, 41, 42] {
            let output = TransactionOutput::new(
                wallet.public_key(),
                value,
                GENESIS_TRANSACTION_ID.to_string(),
                OutputRole::Payment,
            );
            state.utxos.insert(output.id.clone(), output);
        }

        let tx = wallet
            .send_funds(&recipient.public_key(), 60, &state)
            .unwrap();
        // Any two of the outputs exceed 60; the walk never needs all three.
        assert_eq!(tx.inputs.len(), 2);
    }
}
