use crate::config::LedgerConfig;
use crate::crypto::{sha256_hex, KeyPair};
use crate::error::ChainError;
use crate::miner::mine_block;
use crate::transaction::Transaction;
use secp256k1::PublicKey;
use tracing::{info, warn};

use super::state::LedgerState;

/// Sentinel `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One link of the hash chain: an ordered batch of transactions committed to
/// by a Merkle root and sealed by a proof-of-work hash.
///
/// A block is created unmined (empty Merkle root, nonce 0); mining fills in
/// the root and searches the nonce. After mining the block is final and
/// `hash == compute_hash()` holds at all times.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub hash: String,
    pub previous_hash: String,
    pub merkle_root: String,
    pub timestamp: u64,
    pub nonce: u64,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(previous_hash: String) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        let mut block = Block {
            hash: String::new(),
            previous_hash,
            merkle_root: String::new(),
            timestamp,
            nonce: 0,
            transactions: Vec::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Hash of `previous_hash ∥ timestamp ∥ nonce ∥ merkle_root`.
    pub fn compute_hash(&self) -> String {
        sha256_hex(&format!(
            "{}{}{}{}",
            self.previous_hash, self.timestamp, self.nonce, self.merkle_root
        ))
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Adds a transaction to this block.
    ///
    /// For every block except genesis the transaction must first pass the
    /// engine's validation/apply step; a rejected transaction is discarded
    /// with no partial effect on the block or the registry.
    pub fn add_transaction(
        &mut self,
        mut transaction: Transaction,
        state: &mut LedgerState,
        config: &LedgerConfig,
    ) -> Result<(), ChainError> {
        if !self.is_genesis() {
            if let Err(e) = transaction.process(state, config.minimum_transaction) {
                warn!("Transaction failed to process, discarded: {}", e);
                return Err(e);
            }
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn transaction_ids(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }
}

/// The ordered chain of blocks together with the UTXO registry it implies.
pub struct Blockchain {
    pub blocks: Vec<Block>,
    pub state: LedgerState,
    pub config: LedgerConfig,
}

impl Blockchain {
    pub fn new(config: LedgerConfig) -> Self {
        Blockchain {
            blocks: Vec::new(),
            state: LedgerState::new(),
            config,
        }
    }

    /// Creates, mines, and appends the genesis block: a single coinbase-signed
    /// transaction granting `amount` coins to `recipient`, whose output is
    /// seeded directly into the registry without prior-input validation.
    pub fn create_genesis(
        &mut self,
        coinbase: &KeyPair,
        recipient: &PublicKey,
        amount: u64,
    ) -> Result<(), ChainError> {
        if !self.blocks.is_empty() {
            return Err(ChainError::ChainBroken(
                "Genesis block can only be applied to an empty chain".to_string(),
            ));
        }

        let genesis_tx = Transaction::genesis(coinbase, *recipient, amount)?;
        let genesis_output = genesis_tx.outputs[0].clone();
        self.state
            .utxos
            .insert(genesis_output.id.clone(), genesis_output);

        let mut block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
        block.add_transaction(genesis_tx, &mut self.state, &self.config)?;

        info!("Creating and mining genesis block");
        self.mine_and_append(block)
    }

    /// Mines `block` at the configured difficulty and appends it.
    pub fn mine_and_append(&mut self, mut block: Block) -> Result<(), ChainError> {
        mine_block(&mut block, self.config.difficulty, self.config.max_mine_attempts)?;
        self.blocks.push(block);
        Ok(())
    }

    /// Hash of the chain tip, or the genesis sentinel for an empty chain.
    pub fn latest_hash(&self) -> String {
        self.blocks
            .last()
            .map(|block| block.hash.clone())
            .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string())
    }

    pub fn genesis_transaction(&self) -> Option<&Transaction> {
        self.blocks.first()?.transactions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionInput, GENESIS_TRANSACTION_ID};

    fn test_config() -> LedgerConfig {
        LedgerConfig {
            difficulty: 2,
            minimum_transaction: 1,
            max_mine_attempts: None,
        }
    }

    #[test]
    fn test_block_hash_covers_all_header_fields() {
        let block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
        assert_eq!(block.hash, block.compute_hash());

        let mut tampered = block.clone();
        tampered.nonce += 1;
        assert_ne!(tampered.compute_hash(), block.hash);

        let mut relinked = block.clone();
        relinked.previous_hash = "abc".to_string();
        assert_ne!(relinked.compute_hash(), block.hash);
    }

    #[test]
    fn test_genesis_block_detection() {
        assert!(Block::new(GENESIS_PREVIOUS_HASH.to_string()).is_genesis());
        assert!(!Block::new(sha256_hex("tip")).is_genesis());
    }

    #[test]
    fn test_create_genesis_seeds_registry() {
        let coinbase = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let mut chain = Blockchain::new(test_config());
        chain
            .create_genesis(&coinbase, &recipient.public_key, 100)
            .unwrap();

        assert_eq!(chain.blocks.len(), 1);
        assert!(chain.blocks[0].is_genesis());
        let genesis_tx = chain.genesis_transaction().unwrap();
        assert_eq!(genesis_tx.id, GENESIS_TRANSACTION_ID);
        assert_eq!(chain.state.balance_of(&recipient.public_key), 100);
    }

    #[test]
    fn test_create_genesis_twice_is_rejected() {
        let coinbase = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let mut chain = Blockchain::new(test_config());
        chain
            .create_genesis(&coinbase, &recipient.public_key, 100)
            .unwrap();
        let err = chain
            .create_genesis(&coinbase, &recipient.public_key, 100)
            .unwrap_err();
        assert!(matches!(err, ChainError::ChainBroken(_)));
    }

    #[test]
    fn test_rejected_transaction_leaves_block_empty() {
        let coinbase = KeyPair::generate().unwrap();
        let sender = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let mut chain = Blockchain::new(test_config());
        chain
            .create_genesis(&coinbase, &sender.public_key, 100)
            .unwrap();

        // Unsigned transaction: rejected by the engine, never added.
        let tx = Transaction::new(
            sender.public_key,
            recipient.public_key,
            10,
            vec![TransactionInput::new("missing".to_string())],
        );
        let mut block = Block::new(chain.latest_hash());
        let err = block
            .add_transaction(tx, &mut chain.state, &chain.config)
            .unwrap_err();
        assert!(matches!(err, ChainError::SignatureInvalid(_)));
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn test_latest_hash_tracks_tip() {
        let coinbase = KeyPair::generate().unwrap();
        let recipient = KeyPair::generate().unwrap();

        let mut chain = Blockchain::new(test_config());
        assert_eq!(chain.latest_hash(), GENESIS_PREVIOUS_HASH);

        chain
            .create_genesis(&coinbase, &recipient.public_key, 100)
            .unwrap();
        assert_eq!(chain.latest_hash(), chain.blocks[0].hash);

        let block = Block::new(chain.latest_hash());
        chain.mine_and_append(block).unwrap();
        assert_eq!(chain.latest_hash(), chain.blocks[1].hash);
        assert_eq!(chain.blocks[1].previous_hash, chain.blocks[0].hash);
    }
}
