/// Transaction types for minichain
use crate::crypto::{public_key_hex, sha256_hex, KeyPair};
use crate::error::ChainError;
use secp256k1::PublicKey;

/// Sentinel id of the genesis transaction. The genesis transaction is seeded
/// directly into the registry and never validated against prior inputs.
pub const GENESIS_TRANSACTION_ID: &str = "0";

/// Why an output exists within its transaction.
///
/// Every successfully processed transfer produces exactly two outputs: the
/// payment to the recipient first, then the change back to the sender. The
/// role tag makes that correlation explicit instead of relying purely on
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputRole {
    Payment,
    Change,
}

/// An unspent output: a claim on `value` coins by `recipient`, spendable
/// exactly once. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionOutput {
    pub id: String,
    pub recipient: PublicKey,
    pub value: u64,
    pub parent_transaction_id: String,
    pub role: OutputRole,
}

impl TransactionOutput {
    pub fn new(
        recipient: PublicKey,
        value: u64,
        parent_transaction_id: String,
        role: OutputRole,
    ) -> Self {
        let id = sha256_hex(&format!(
            "{}{}{}",
            public_key_hex(&recipient),
            value,
            parent_transaction_id
        ));
        TransactionOutput {
            id,
            recipient,
            value,
            parent_transaction_id,
            role,
        }
    }

    /// Ownership is decided by comparing canonical key encodings, never by
    /// reference identity.
    pub fn is_owned_by(&self, key: &PublicKey) -> bool {
        self.recipient == *key
    }
}

/// A reference to a [`TransactionOutput`] being consumed.
///
/// The input does not own the output; it holds a lookup key plus a transient
/// resolved copy filled in by the engine during processing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionInput {
    pub output_id: String,
    pub resolved: Option<TransactionOutput>,
}

impl TransactionInput {
    pub fn new(output_id: String) -> Self {
        TransactionInput {
            output_id,
            resolved: None,
        }
    }
}

/// A value transfer from `sender` to `recipient`, funded by `inputs` and
/// settled into `outputs` once processed against the registry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub id: String,
    pub sender: PublicKey,
    pub recipient: PublicKey,
    pub value: u64,
    pub signature: Option<Vec<u8>>,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        sender: PublicKey,
        recipient: PublicKey,
        value: u64,
        inputs: Vec<TransactionInput>,
    ) -> Self {
        Transaction {
            id: String::new(),
            sender,
            recipient,
            value,
            signature: None,
            inputs,
            outputs: Vec::new(),
        }
    }

    /// Builds the signed genesis transaction: id `"0"`, a single payment
    /// output granting `value` coins to `recipient`, funded by nothing.
    pub fn genesis(
        coinbase: &KeyPair,
        recipient: PublicKey,
        value: u64,
    ) -> Result<Self, ChainError> {
        let mut tx = Transaction::new(coinbase.public_key, recipient, value, Vec::new());
        tx.sign(coinbase)?;
        tx.id = GENESIS_TRANSACTION_ID.to_string();
        tx.outputs.push(TransactionOutput::new(
            tx.recipient,
            tx.value,
            tx.id.clone(),
            OutputRole::Payment,
        ));
        Ok(tx)
    }

    /// Canonical byte encoding of `(sender, recipient, value)`, the message
    /// covered by the signature.
    pub fn signable_message(&self) -> Vec<u8> {
        let mut message = Vec::new();
        message.extend_from_slice(&self.sender.serialize());
        message.extend_from_slice(&self.recipient.serialize());
        message.extend_from_slice(&self.value.to_le_bytes());
        message
    }

    pub fn sign(&mut self, keypair: &KeyPair) -> Result<(), ChainError> {
        let signature = keypair.sign(&self.signable_message())?;
        self.signature = Some(signature.to_vec());
        Ok(())
    }

    /// Total value of the resolved inputs. Inputs that were never resolved
    /// against the registry are skipped, not counted as zero-value failures.
    pub fn input_value(&self) -> u64 {
        self.inputs
            .iter()
            .filter_map(|input| input.resolved.as_ref())
            .map(|output| output.value)
            .sum()
    }

    /// Total value of the produced outputs.
    pub fn output_value(&self) -> u64 {
        self.outputs.iter().map(|output| output.value).sum()
    }

    pub fn payment_output(&self) -> Option<&TransactionOutput> {
        self.outputs
            .iter()
            .find(|output| output.role == OutputRole::Payment)
    }

    pub fn change_output(&self) -> Option<&TransactionOutput> {
        self.outputs
            .iter()
            .find(|output| output.role == OutputRole::Change)
    }
}
