//! Merkle commitment over a block's transaction ids.
//!
//! The scheme is a sequential pairwise fold, not a balanced binary tree: each
//! layer is built by hashing every adjacent pair of the previous layer
//! starting from index 1, so a layer of n elements shrinks to n - 1. This is
//! deliberately kept as-is for compatibility with the existing chain format.

use crate::crypto::sha256_hex;

/// Folds an ordered sequence of transaction ids into a single root hash.
///
/// A single id is returned unchanged, with no hashing. An empty list yields
/// the empty string; the degenerate case is part of the format, not an error.
pub fn merkle_root(transaction_ids: &[String]) -> String {
    let mut layer: Vec<String> = transaction_ids.to_vec();

    while layer.len() > 1 {
        let mut next_layer = Vec::with_capacity(layer.len() - 1);
        for i in 1..layer.len() {
            next_layer.push(sha256_hex(&format!("{}{}", layer[i - 1], layer[i])));
        }
        layer = next_layer;
    }

    layer.into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_yields_empty_root() {
        assert_eq!(merkle_root(&[]), "");
    }

    #[test]
    fn test_single_id_is_returned_unchanged() {
        let id = sha256_hex("only transaction");
        assert_eq!(merkle_root(&[id.clone()]), id);
    }

    #[test]
    fn test_pair_is_hashed_together() {
        let a = sha256_hex("tx a");
        let b = sha256_hex("tx b");
        let expected = sha256_hex(&format!("{}{}", a, b));
        assert_eq!(merkle_root(&[a, b]), expected);
    }

    #[test]
    fn test_triple_uses_sequential_fold() {
        let a = sha256_hex("tx a");
        let b = sha256_hex("tx b");
        let c = sha256_hex("tx c");

        // Layer 1: [H(a+b), H(b+c)], layer 2: [H(H(a+b) + H(b+c))]
        let ab = sha256_hex(&format!("{}{}", a, b));
        let bc = sha256_hex(&format!("{}{}", b, c));
        let expected = sha256_hex(&format!("{}{}", ab, bc));

        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_root_depends_on_order() {
        let a = sha256_hex("tx a");
        let b = sha256_hex("tx b");
        assert_ne!(
            merkle_root(&[a.clone(), b.clone()]),
            merkle_root(&[b, a])
        );
    }
}
