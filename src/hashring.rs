use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
#[cfg(feature = "derive")]
use serde::{Deserialize, Serialize};

use crate::{Acquire, Config, Error, Result};

mod crud;
mod iterator;
mod ranges;
mod virtual_node;

pub use iterator::HashRingIterator;
pub use virtual_node::SEPARATOR;
use virtual_node::VirtualNode;

/// Replica bookkeeping for one physical node.
///
/// `live` counts the virtual nodes currently on the ring, `next_index` is the replica
/// index the next added virtual node receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Membership {
    live: usize,
    next_index: usize,
}

#[derive(Debug)]
struct State<N> {
    ring: BTreeMap<u64, VirtualNode<N>>,
    members: HashMap<String, Membership>,
}

impl<N> Default for State<N> {
    fn default() -> Self {
        State {
            ring: BTreeMap::new(),
            members: HashMap::new(),
        }
    }
}

/// Outcome of adding virtual nodes for one physical node.
///
/// * `first_index` - replica index of the first virtual node created by this call
/// * `inserted` - virtual nodes that now occupy a slot on the ring
/// * `collisions` - placements whose hash slot was already taken
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct AddReport {
    pub first_index: usize,
    pub inserted: usize,
    pub collisions: usize,
}

/// One virtual node as seen from outside the ring.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct Placement<N> {
    pub hash: u64,
    pub index: usize,
    pub node: N,
}

/// A range of hashes resolved to `node`. Keys hashing into `hash_range` are owned by `node`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct HashRange<N> {
    pub hash_range: RangeInclusive<u64>,
    pub node: N,
}

/// HashRing maps keys to physical nodes using consistent hashing
/// HashRing places every physical node on the ring through a number of virtual nodes
/// HashRing can be shared between threads; all access goes through one reader/writer lock
#[derive(Debug)]
pub struct HashRing<N, H> {
    hash_function: H,
    config: Config,
    state: RwLock<State<N>>,
}

impl<N, H> HashRing<N, H> {
    /// Create an empty `HashRing` that places nodes and keys with `hash_function`.
    ///
    /// The ring fails fast on contention, see [`Acquire::Try`].
    pub fn new(hash_function: H) -> HashRing<N, H> {
        HashRing::with_config(hash_function, Config::default())
    }

    /// Create an empty `HashRing`.
    ///
    /// # Arguments
    ///
    /// * `hash_function` - places virtual nodes and resolves keys, must be deterministic
    /// * `config` - lock acquisition policy and the behaviour on placement collisions
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use consistent_hashring::{Acquire, Collision, Config, HashRing, Md5HashFunction, PhysicalNode};
    ///
    /// let config = Config {
    ///     acquire: Acquire::Timeout(Duration::from_millis(10)),
    ///     on_collision: Collision::KeepExisting,
    /// };
    /// let ring: HashRing<PhysicalNode, _> = HashRing::with_config(Md5HashFunction, config);
    /// assert!(ring.is_empty().unwrap());
    /// ```
    pub fn with_config(hash_function: H, config: Config) -> HashRing<N, H> {
        HashRing {
            hash_function,
            config,
            state: RwLock::new(State::default()),
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn hash_function(&self) -> &H {
        &self.hash_function
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State<N>>> {
        acquire(
            self.config.acquire,
            || self.state.try_read(),
            || self.state.read(),
            |timeout| self.state.try_read_for(timeout),
        )
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State<N>>> {
        acquire(
            self.config.acquire,
            || self.state.try_write(),
            || self.state.write(),
            |timeout| self.state.try_write_for(timeout),
        )
    }
}

// Waiting callers (Block and Timeout) queue on the lock; a parked writer holds back new
// readers, so neither side starves.
fn acquire<G>(
    policy: Acquire,
    try_lock: impl FnOnce() -> Option<G>,
    lock: impl FnOnce() -> G,
    lock_for: impl FnOnce(Duration) -> Option<G>,
) -> Result<G> {
    match policy {
        Acquire::Try => try_lock().ok_or(Error::LockUnavailable),
        Acquire::Block => Ok(lock()),
        Acquire::Timeout(timeout) => lock_for(timeout).ok_or(Error::LockTimeout(timeout)),
    }
}
