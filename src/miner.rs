//! Proof-of-work mining: brute-force nonce search against a leading-zero
//! hex target.

use crate::blockchain::Block;
use crate::crypto::difficulty_target;
use crate::error::ChainError;
use crate::merkle::merkle_root;
use tracing::info;

/// Computes the block's Merkle root, then increments the nonce and rehashes
/// until the first `difficulty` hex characters of the block hash equal the
/// all-zero target.
///
/// `max_attempts` bounds the search: `Some(n)` gives up with
/// [`ChainError::MiningExhausted`] after `n` rehashes, `None` searches
/// without bound. Returns the number of attempts taken.
pub fn mine_block(
    block: &mut Block,
    difficulty: usize,
    max_attempts: Option<u64>,
) -> Result<u64, ChainError> {
    block.merkle_root = merkle_root(&block.transaction_ids());
    block.hash = block.compute_hash();

    let target = difficulty_target(difficulty);
    let mut attempts: u64 = 0;

    while !block.hash.starts_with(&target) {
        if let Some(limit) = max_attempts {
            if attempts >= limit {
                return Err(ChainError::MiningExhausted(format!(
                    "No hash with prefix {:?} found within {} attempts",
                    target, limit
                )));
            }
        }
        block.nonce += 1;
        block.hash = block.compute_hash();
        attempts += 1;
    }

    info!("Block mined: {}", block.hash);
    Ok(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::GENESIS_PREVIOUS_HASH;

    #[test]
    fn test_mined_hash_carries_difficulty_prefix() {
        for difficulty in [1usize, 2, 3] {
            let mut block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
            mine_block(&mut block, difficulty, None).unwrap();
            assert!(block.hash.starts_with(&"0".repeat(difficulty)));
            assert_eq!(block.hash, block.compute_hash());
        }
    }

    #[test]
    fn test_mining_sets_merkle_root_before_searching() {
        let mut block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
        assert_eq!(block.merkle_root, "");
        mine_block(&mut block, 1, None).unwrap();
        // No transactions: the root stays the degenerate empty string, but
        // the stored hash already commits to it.
        assert_eq!(block.merkle_root, merkle_root(&[]));
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn test_zero_difficulty_succeeds_immediately() {
        let mut block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
        let attempts = mine_block(&mut block, 0, None).unwrap();
        assert_eq!(attempts, 0);
        assert_eq!(block.nonce, 0);
    }

    #[test]
    fn test_bounded_search_reports_exhaustion() {
        let mut block = Block::new(GENESIS_PREVIOUS_HASH.to_string());
        // A 16-zero prefix will not show up in 10 attempts.
        let err = mine_block(&mut block, 16, Some(10)).unwrap_err();
        assert!(matches!(err, ChainError::MiningExhausted(_)));
        assert_eq!(block.nonce, 10);
    }
}
