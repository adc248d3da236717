// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Trust topology
//!
//! Every deployed ledger must accept messages from every other one. The
//! required edges are recomputed from the full deployed set on every run and
//! applied unconditionally; `setPeer` is idempotent, so re-applying an
//! existing edge changes nothing.

use std::collections::BTreeSet;

/// An unordered pair of chains, stored with the lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrustEdge {
    pub a: u64,
    pub b: u64,
}

impl TrustEdge {
    pub fn new(x: u64, y: u64) -> Self {
        Self {
            a: x.min(y),
            b: x.max(y),
        }
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.a == chain_id || self.b == chain_id
    }
}

/// Complete graph over `chain_ids`, in a deterministic order.
pub fn complete_graph(chain_ids: impl IntoIterator<Item = u64>) -> Vec<TrustEdge> {
    let nodes: Vec<u64> = chain_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    nodes
        .iter()
        .enumerate()
        .flat_map(|(i, a)| nodes[i + 1..].iter().map(move |b| TrustEdge::new(*a, *b)))
        .collect()
}

/// Whether `edges` connect every pair of `chain_ids`.
pub fn is_complete(chain_ids: &[u64], edges: &[TrustEdge]) -> bool {
    let present: BTreeSet<TrustEdge> = edges.iter().copied().collect();
    complete_graph(chain_ids.iter().copied())
        .iter()
        .all(|edge| present.contains(edge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![43113], 0)]
    #[case(vec![43113, 84532], 1)]
    #[case(vec![43113, 84532, 421614], 3)]
    #[case(vec![1, 2, 3, 4, 5], 10)]
    fn test_edge_count(#[case] chains: Vec<u64>, #[case] expected: usize) {
        assert_eq!(complete_graph(chains).len(), expected);
    }

    #[test]
    fn test_graph_is_order_independent() {
        let forward = complete_graph([43113, 84532, 421614]);
        let backward = complete_graph([421614, 84532, 43113, 84532]);
        assert_eq!(forward, backward);
        assert_eq!(forward[0], TrustEdge::new(84532, 43113));
    }

    #[test]
    fn test_extension_keeps_existing_edges() {
        let before = complete_graph([43113, 84532]);
        let after = complete_graph([43113, 84532, 421614]);

        assert!(before.iter().all(|edge| after.contains(edge)));
        assert!(is_complete(&[43113, 84532, 421614], &after));
        assert!(!is_complete(&[43113, 84532, 421614], &before));
    }
}
