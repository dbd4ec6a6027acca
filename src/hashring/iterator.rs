use std::collections::btree_map;

use super::virtual_node::VirtualNode;
use super::{HashRing, Placement};
use crate::{Node, Result};

/// Yields the placements of a consumed [`HashRing`] in ascending hash order.
pub struct HashRingIterator<N> {
    ring: btree_map::IntoIter<u64, VirtualNode<N>>,
}

impl<N: Node> Iterator for HashRingIterator<N> {
    type Item = Placement<N>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ring
            .next()
            .map(|(hash, virtual_node)| virtual_node.into_placement(hash))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ring.size_hint()
    }
}

impl<N: Node, H> IntoIterator for HashRing<N, H> {
    type Item = Placement<N>;

    type IntoIter = HashRingIterator<N>;

    fn into_iter(self) -> Self::IntoIter {
        let state = self.state.into_inner();

        HashRingIterator {
            ring: state.ring.into_iter(),
        }
    }
}

impl<N, H> HashRing<N, H>
where
    N: Node + Clone,
{
    /// Snapshot of all virtual nodes in ascending hash order.
    pub fn placements(&self) -> Result<Vec<Placement<N>>> {
        let state = self.read()?;

        Ok(state
            .ring
            .iter()
            .map(|(hash, virtual_node)| virtual_node.clone().into_placement(*hash))
            .collect())
    }
}
