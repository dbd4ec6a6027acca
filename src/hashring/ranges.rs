use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::virtual_node::VirtualNode;
use super::{HashRange, HashRing};
use crate::{Node, Result};

impl<N, H> HashRing<N, H>
where
    N: Node + Clone,
{
    /// Returns the hash ranges owned by each physical node, sorted by range start.
    ///
    /// Every placement owns the hashes after its predecessor up to and including its own
    /// hash. The range of the first placement wraps around the end of the hash space and
    /// is returned as two ranges, `last + 1..=u64::MAX` and `0..=first`. Adjacent ranges
    /// with the same owner are merged. An empty ring returns no ranges.
    pub fn hash_ranges(&self) -> Result<Vec<HashRange<N>>> {
        let state = self.read()?;
        Ok(merge_ranges(split_ranges(&state.ring)))
    }

    /// Compares this ring against `previous` and returns the hash ranges that changed
    /// owner, together with their new owner.
    ///
    /// After adding nodes to a ring, keys in these ranges need to move to the returned
    /// nodes; all other keys stay where they are. Hashes that had no owner in `previous`
    /// (an empty ring) are not reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use consistent_hashring::{HashRing, Node, PhysicalNode, SipHashFunction};
    ///
    /// let before = HashRing::new(SipHashFunction);
    /// let after = HashRing::new(SipHashFunction);
    /// for id in 1..=3 {
    ///     let node = PhysicalNode::new(format!("127.0.0.{id}"));
    ///     before.add_node(&node, 50).unwrap();
    ///     after.add_node(&node, 50).unwrap();
    /// }
    ///
    /// let joined = PhysicalNode::new("127.0.0.4");
    /// after.add_node(&joined, 50).unwrap();
    ///
    /// // only keys handed over to the new node move
    /// let moved = after.reassigned_ranges(&before).unwrap();
    /// assert!(moved.iter().all(|range| range.node.key() == joined.key()));
    /// ```
    pub fn reassigned_ranges(&self, previous: &HashRing<N, H>) -> Result<Vec<HashRange<N>>> {
        let from = previous.hash_ranges()?;
        let to = self.hash_ranges()?;

        let mut reassigned = vec![];
        let (mut i, mut j) = (0, 0);

        while i < to.len() && j < from.len() {
            let (needed, supply) = (&to[i], &from[j]);

            if let Some(range) = intersect(&needed.hash_range, &supply.hash_range) {
                if needed.node.key() != supply.node.key() {
                    reassigned.push(HashRange {
                        hash_range: range,
                        node: needed.node.clone(),
                    });
                }
            }

            if needed.hash_range.end() < supply.hash_range.end() {
                i += 1;
            } else {
                j += 1;
            }
        }

        Ok(merge_ranges(reassigned))
    }
}

fn split_ranges<N: Node + Clone>(ring: &BTreeMap<u64, VirtualNode<N>>) -> Vec<HashRange<N>> {
    let mut ranges = vec![];

    let mut left = match ring.last_key_value() {
        Some((hash, _)) => *hash,
        None => return ranges,
    };

    if ring.len() == 1 {
        return ring
            .values()
            .map(|virtual_node| HashRange {
                hash_range: 0..=u64::MAX,
                node: virtual_node.physical_node().clone(),
            })
            .collect();
    }

    for (&right, virtual_node) in ring {
        let node = virtual_node.physical_node();

        if left >= right {
            if left < u64::MAX {
                ranges.push(HashRange {
                    hash_range: left + 1..=u64::MAX,
                    node: node.clone(),
                });
            }
            ranges.push(HashRange {
                hash_range: 0..=right,
                node: node.clone(),
            });
        } else {
            ranges.push(HashRange {
                hash_range: left + 1..=right,
                node: node.clone(),
            });
        }

        left = right;
    }

    ranges
}

fn merge_ranges<N: Node>(mut ranges: Vec<HashRange<N>>) -> Vec<HashRange<N>> {
    ranges.sort_by_key(|range| *range.hash_range.start());

    let mut merged: Vec<HashRange<N>> = Vec::with_capacity(ranges.len());

    for range in ranges {
        if let Some(current) = merged.last_mut() {
            let end = *current.hash_range.end();
            if current.node.key() == range.node.key()
                && end < u64::MAX
                && end + 1 == *range.hash_range.start()
            {
                current.hash_range = *current.hash_range.start()..=*range.hash_range.end();
                continue;
            }
        }
        merged.push(range);
    }

    merged
}

fn intersect<T: Ord + Copy>(
    a: &RangeInclusive<T>,
    b: &RangeInclusive<T>,
) -> Option<RangeInclusive<T>> {
    let start = *a.start().max(b.start());
    let end = *a.end().min(b.end());

    if start <= end {
        Some(start..=end)
    } else {
        None
    }
}
