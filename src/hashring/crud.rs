use std::collections::HashMap;
use std::collections::btree_map::Entry;

use tracing::{debug, info, warn};

use super::virtual_node::{VirtualNode, placement_key};
use super::{AddReport, HashRing, Membership, State};
use crate::{Collision, Error, HashFunction, Node, Result};

impl<N, H> HashRing<N, H>
where
    N: Node + Clone,
    H: HashFunction,
{
    /// Add `virtual_node_count` virtual nodes for `node` to the hash ring.
    ///
    /// Adding a node that is already on the ring extends its replica set: the new
    /// virtual nodes continue at the next replica index instead of starting at 0.
    ///
    /// Returns `Ok(true)` if at least one virtual node was inserted and `Ok(false)` if
    /// nothing changed, e.g. for `virtual_node_count == 0`.
    pub fn add_node(&self, node: &N, virtual_node_count: usize) -> Result<bool> {
        self.add_node_with_report(node, virtual_node_count)
            .map(|report| report.inserted > 0)
    }

    /// Same as [`HashRing::add_node`], but reports which replica indices were used and
    /// how many placements collided with an occupied hash slot.
    pub fn add_node_with_report(&self, node: &N, virtual_node_count: usize) -> Result<AddReport> {
        info!(
            node = node.key(),
            virtual_node_count, "hydrating node with virtual nodes"
        );

        let mut state = self.write()?;
        let State { ring, members } = &mut *state;

        let identity = node.key();
        let first_index = members.get(identity).map_or(0, |m| m.next_index);
        let end = first_index.checked_add(virtual_node_count).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{virtual_node_count} virtual nodes exceed the replica index space of {identity}"
            ))
        })?;

        let mut report = AddReport {
            first_index,
            ..AddReport::default()
        };

        // the membership index follows the ring placement by placement, a panicking
        // hash function or clone leaves both in agreement
        for index in first_index..end {
            let virtual_node = VirtualNode::new(node.clone(), index);
            let hash = self.hash_function.hash(virtual_node.key());

            match ring.entry(hash) {
                Entry::Vacant(slot) => {
                    debug!(hash, placement = virtual_node.key(), "inserted virtual node");
                    slot.insert(virtual_node);
                }
                Entry::Occupied(mut slot) => {
                    report.collisions += 1;
                    warn!(
                        hash,
                        placement = virtual_node.key(),
                        occupied_by = slot.get().key(),
                        policy = ?self.config.on_collision,
                        "virtual node collides with an existing placement"
                    );

                    if self.config.on_collision == Collision::KeepExisting {
                        continue;
                    }

                    let replaced = slot.insert(virtual_node);
                    release(members, replaced.physical_node().key());
                }
            }

            claim(members, identity, index);
            report.inserted += 1;
        }

        if let Some(member) = members.get_mut(identity) {
            member.next_index = end;
        }

        Ok(report)
    }

    /// Remove `node` and all of its virtual nodes from the hash ring.
    ///
    /// Returns `Ok(false)` if the node had no virtual nodes on the ring.
    pub fn remove_node(&self, node: &N) -> Result<bool> {
        info!(node = node.key(), "dropping node and all its virtual nodes");

        let mut state = self.write()?;
        let State { ring, members } = &mut *state;

        let Some(member) = members.get(node.key()).copied() else {
            return Ok(false);
        };

        let mut removed = 0;
        for index in 0..member.next_index {
            let hash = self
                .hash_function
                .hash(&placement_key(node.key(), index));

            let owned = ring
                .get(&hash)
                .is_some_and(|v| v.is_virtual_node_of(node) && v.index() == index);
            if owned {
                ring.remove(&hash);
                release(members, node.key());
                debug!(hash, index, node = node.key(), "removed virtual node");
                removed += 1;
            }
        }

        // placements that could not be derived again (the hash function changed its mind)
        if removed < member.live {
            let before = ring.len();
            ring.retain(|_, v| !v.is_virtual_node_of(node));
            warn!(
                node = node.key(),
                orphans = before - ring.len(),
                "removed virtual nodes by scanning the ring"
            );
            removed += before - ring.len();
        }

        members.remove(node.key());
        Ok(removed > 0)
    }

    /// Returns the physical node responsible for `key`.
    ///
    /// The owner is the first virtual node at or after the key's hash, wrapping around
    /// to the smallest hash on the ring. Returns `Ok(None)` if the ring is empty.
    pub fn choose_node(&self, key: &str) -> Result<Option<N>> {
        let hash = self.hash_function.hash(key);
        let state = self.read()?;

        let chosen = state
            .ring
            .range(hash..)
            .next()
            .or_else(|| state.ring.iter().next())
            .map(|(_, virtual_node)| virtual_node.physical_node().clone());

        Ok(chosen)
    }

    /// Get the number of virtual nodes in the hash ring.
    pub fn total_virtual_node_count(&self) -> Result<usize> {
        Ok(self.read()?.ring.len())
    }

    /// Get the number of distinct physical nodes in the hash ring.
    pub fn total_physical_node_count(&self) -> Result<usize> {
        Ok(self.read()?.members.len())
    }

    /// Get the number of virtual nodes `node` currently owns.
    pub fn virtual_node_count(&self, node: &N) -> Result<usize> {
        let state = self.read()?;
        Ok(state.members.get(node.key()).map_or(0, |m| m.live))
    }

    /// Returns true if the ring has no virtual nodes.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.ring.is_empty())
    }
}

// `identity` gained the placement with replica `index`
fn claim(members: &mut HashMap<String, Membership>, identity: &str, index: usize) {
    let next_index = index + 1;
    match members.get_mut(identity) {
        Some(member) => {
            member.live += 1;
            member.next_index = member.next_index.max(next_index);
        }
        None => {
            members.insert(identity.to_string(), Membership { live: 1, next_index });
        }
    }
}

// `identity` lost one placement
fn release(members: &mut HashMap<String, Membership>, identity: &str) {
    if let Some(member) = members.get_mut(identity) {
        member.live = member.live.saturating_sub(1);
        if member.live == 0 {
            members.remove(identity);
        }
    }
}
