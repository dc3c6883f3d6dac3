//! Whole-chain integrity verification.
//!
//! The validator walks the finished chain end to end, re-deriving every block
//! hash, replaying UTXO consumption against a shadow registry seeded with the
//! genesis output, and confirming every invariant the engine enforced when
//! the chain was built.

use crate::crypto::difficulty_target;
use crate::error::ChainError;
use crate::transaction::{OutputRole, TransactionOutput};
use std::collections::HashMap;
use tracing::warn;

use super::chain::Blockchain;

impl Blockchain {
    /// Returns true only if every block and every transaction passes every
    /// integrity check. See [`validate`](Blockchain::validate) for the
    /// failure reason.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Chain validation failed: {}", e);
                false
            }
        }
    }

    /// Replays the chain from the genesis block onward, short-circuiting on
    /// the first violated invariant.
    pub fn validate(&self) -> Result<(), ChainError> {
        let Some(genesis_block) = self.blocks.first() else {
            // An empty chain has nothing to contradict.
            return Ok(());
        };

        let genesis_output = genesis_block
            .transactions
            .first()
            .and_then(|tx| tx.outputs.first())
            .ok_or_else(|| {
                ChainError::StructuralMismatch(
                    "Genesis block carries no funded transaction".to_string(),
                )
            })?;

        // Shadow registry: only the genesis output is spendable at the start.
        let mut shadow: HashMap<String, TransactionOutput> = HashMap::new();
        shadow.insert(genesis_output.id.clone(), genesis_output.clone());

        let target = difficulty_target(self.config.difficulty);

        for index in 1..self.blocks.len() {
            let current = &self.blocks[index];
            let previous = &self.blocks[index - 1];

            if current.hash != current.compute_hash() {
                return Err(ChainError::HashMismatch(format!(
                    "Stored and recomputed hashes for block {} do not match",
                    index
                )));
            }

            if previous.hash != current.previous_hash {
                return Err(ChainError::ChainBroken(format!(
                    "Previous hash of block {} does not match block {}",
                    index,
                    index - 1
                )));
            }

            if !current.hash.starts_with(&target) {
                return Err(ChainError::ProofOfWorkUnsatisfied(format!(
                    "Block {} has not been mined to difficulty {}",
                    index, self.config.difficulty
                )));
            }

            for (t, tx) in current.transactions.iter().enumerate() {
                tx.verify_signature().map_err(|_| {
                    ChainError::SignatureInvalid(format!(
                        "Signature on transaction {} of block {} is invalid",
                        t, index
                    ))
                })?;

                if tx.input_value() != tx.output_value() {
                    return Err(ChainError::ValueMismatch(format!(
                        "Inputs ({}) are not equal to outputs ({}) on transaction {} of block {}",
                        tx.input_value(),
                        tx.output_value(),
                        t,
                        index
                    )));
                }

                for input in &tx.inputs {
                    let shadow_value = match shadow.get(&input.output_id) {
                        Some(output) => output.value,
                        None => {
                            return Err(ChainError::DanglingInput(format!(
                                "Referenced input on transaction {} of block {} is missing",
                                t, index
                            )));
                        }
                    };

                    let resolved = input.resolved.as_ref().ok_or_else(|| {
                        ChainError::DanglingInput(format!(
                            "Input on transaction {} of block {} was never resolved",
                            t, index
                        ))
                    })?;

                    if resolved.value != shadow_value {
                        return Err(ChainError::ValueMismatch(format!(
                            "Referenced input value on transaction {} of block {} is invalid",
                            t, index
                        )));
                    }

                    shadow.remove(&input.output_id);
                }

                for output in &tx.outputs {
                    shadow.insert(output.id.clone(), output.clone());
                }

                // The engine always settles payment first, change second.
                let payment_ok = tx
                    .outputs
                    .first()
                    .is_some_and(|o| o.role == OutputRole::Payment && o.recipient == tx.recipient);
                if !payment_ok {
                    return Err(ChainError::StructuralMismatch(format!(
                        "Payment output of transaction {} of block {} is not addressed to its recipient",
                        t, index
                    )));
                }

                let change_ok = tx
                    .outputs
                    .get(1)
                    .is_some_and(|o| o.role == OutputRole::Change && o.recipient == tx.sender);
                if !change_ok {
                    return Err(ChainError::StructuralMismatch(format!(
                        "Change output of transaction {} of block {} does not return to its sender",
                        t, index
                    )));
                }
            }
        }

        Ok(())
    }
}
