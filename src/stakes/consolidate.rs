use std::collections::HashMap;

use crate::common::types::StakePair;

/// Merges pairings between the same two players
pub struct Consolidator;

impl Consolidator {
    /// One pairing per unordered player pair, amounts summed
    ///
    /// Output follows the first appearance of each pair. A pair seen as
    /// (p3, p1) after (p1, p3) keeps the first orientation. Zero-amount
    /// pairings are dropped.
    pub fn consolidate(pairs: &[StakePair]) -> Vec<StakePair> {
        let mut index: HashMap<(&str, &str), usize> = HashMap::with_capacity(pairs.len());
        let mut merged: Vec<StakePair> = Vec::with_capacity(pairs.len());

        for pair in pairs {
            match index.get(&pair.key()) {
                Some(&i) => merged[i].amount += pair.amount,
                None => {
                    index.insert(pair.key(), merged.len());
                    merged.push(pair.clone());
                }
            }
        }

        merged.retain(|p| p.amount > 0);
        merged
    }
}
