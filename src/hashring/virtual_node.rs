use crate::Node;

use super::Placement;

/// Joins a physical node's key and a replica index into a placement key.
///
/// Replica indices are rendered in decimal, so the last separator of a placement key
/// always splits it back into identity and index, even if the identity contains `_`.
pub const SEPARATOR: char = '_';

pub(crate) fn placement_key(identity: &str, index: usize) -> String {
    format!("{identity}{SEPARATOR}{index}")
}

// VirtualNode is one replica of a physical node on the ring. The placement key is
// derived once and never recomputed.
#[derive(Clone, Debug)]
pub(crate) struct VirtualNode<N> {
    physical: N,
    index: usize,
    key: String,
}

impl<N: Node> VirtualNode<N> {
    pub(crate) fn new(physical: N, index: usize) -> VirtualNode<N> {
        let key = placement_key(physical.key(), index);
        VirtualNode {
            physical,
            index,
            key,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn physical_node(&self) -> &N {
        &self.physical
    }

    pub(crate) fn is_virtual_node_of<M: Node + ?Sized>(&self, node: &M) -> bool {
        self.physical.key() == node.key()
    }

    pub(crate) fn into_placement(self, hash: u64) -> Placement<N> {
        Placement {
            hash,
            index: self.index,
            node: self.physical,
        }
    }
}
