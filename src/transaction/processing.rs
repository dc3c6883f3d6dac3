/// The UTXO-processing engine: validates a proposed transfer against the
/// registry and, on success, settles it into new outputs.
use crate::blockchain::LedgerState;
use crate::crypto::{self, public_key_hex, sha256_hex};
use crate::error::ChainError;
use crate::transaction::types::{OutputRole, Transaction, TransactionOutput};
use tracing::warn;

impl Transaction {
    /// Verifies the signature over the canonical `(sender, recipient, value)`
    /// encoding with the sender's public key.
    pub fn verify_signature(&self) -> Result<(), ChainError> {
        let signature = self.signature.as_ref().ok_or_else(|| {
            ChainError::SignatureInvalid("Transaction is not signed".to_string())
        })?;

        crypto::verify_signature(&self.sender, &self.signable_message(), signature).map_err(
            |_| {
                ChainError::SignatureInvalid(
                    "Signature does not verify over (sender, recipient, value)".to_string(),
                )
            },
        )
    }

    /// Validates this transaction and applies it to the registry.
    ///
    /// Inputs whose referenced output id is absent from the registry are left
    /// unresolved and excluded from the input-value sum. Known design gap
    /// inherited from the chain format: a transaction carrying dangling
    /// references is still accepted as long as its resolved inputs cover the
    /// requested value.
    ///
    /// On any failure the registry is left untouched.
    pub fn process(
        &mut self,
        state: &mut LedgerState,
        minimum_transaction: u64,
    ) -> Result<(), ChainError> {
        self.verify_signature()?;

        // Resolve each input against the registry.
        let mut unresolved: Vec<String> = Vec::new();
        for input in &mut self.inputs {
            input.resolved = state.utxos.get(&input.output_id).cloned();
            if input.resolved.is_none() {
                unresolved.push(input.output_id.clone());
            }
        }

        let total = self.input_value();
        if total < minimum_transaction {
            // An already-spent output is the usual way to land here: its id
            // has been removed from the registry, so the input contributed
            // nothing to the sum.
            if let Some(missing) = unresolved.first() {
                return Err(ChainError::DanglingInput(format!(
                    "Referenced output {} is not in the registry and resolved inputs total {} (minimum {})",
                    missing, total, minimum_transaction
                )));
            }
            return Err(ChainError::InsufficientFunds(format!(
                "Transaction inputs too small: {} (minimum {})",
                total, minimum_transaction
            )));
        }
        if total < self.value {
            return Err(ChainError::InsufficientFunds(format!(
                "Resolved inputs total {} but transaction spends {}",
                total, self.value
            )));
        }
        let leftover = total - self.value;

        self.id = self.derive_id(state.next_sequence());

        // Payment to the recipient first, change back to the sender second.
        // The validator relies on this ordering.
        self.outputs.push(TransactionOutput::new(
            self.recipient,
            self.value,
            self.id.clone(),
            OutputRole::Payment,
        ));
        self.outputs.push(TransactionOutput::new(
            self.sender,
            leftover,
            self.id.clone(),
            OutputRole::Change,
        ));

        for output in &self.outputs {
            state.utxos.insert(output.id.clone(), output.clone());
        }

        // Consumed outputs leave the registry; unresolved inputs are skipped.
        for input in &self.inputs {
            if let Some(resolved) = &input.resolved {
                state.utxos.remove(&resolved.id);
            }
        }

        if !unresolved.is_empty() {
            warn!(
                "Transaction {} accepted with {} unresolved input(s)",
                self.id,
                unresolved.len()
            );
        }

        Ok(())
    }

    /// Transaction id: hash of sender key, recipient key, value, and the
    /// ledger's monotonic sequence number.
    fn derive_id(&self, sequence: u64) -> String {
        sha256_hex(&format!(
            "{}{}{}{}",
            public_key_hex(&self.sender),
            public_key_hex(&self.recipient),
            self.value,
            sequence
        ))
    }
}
