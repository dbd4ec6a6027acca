//! A ring based consistent hash: maps arbitrary keys onto a dynamic set of physical nodes
//! so that adding or removing a node only relocates a bounded share of keys.
//!
//! Every physical node is represented by a number of virtual nodes. Each virtual node
//! is placed on the ring at the hash of its placement key (`identity_replica`).
//! A key is resolved by hashing it and walking clockwise to the next placement,
//! wrapping around to the smallest placement if none follows.
//!
//! The ring is a passive, thread safe object. All state lives behind a single
//! reader/writer lock; how the lock is acquired is chosen with [`Acquire`]:
//! - Try: fail fast with [`Error::LockUnavailable`] if the lock is contended (default)
//! - Block: wait for the lock
//! - Timeout: wait for a bounded time, then fail with [`Error::LockTimeout`]
//!
//! ```
//! use consistent_hashring::{HashRing, PhysicalNode, SipHashFunction};
//!
//! let ring = HashRing::new(SipHashFunction);
//! let cache_a = PhysicalNode::new("cache-a");
//! let cache_b = PhysicalNode::new("cache-b");
//!
//! assert!(ring.add_node(&cache_a, 100).unwrap());
//! assert!(ring.add_node(&cache_b, 100).unwrap());
//!
//! let owner = ring.choose_node("user:42").unwrap();
//! assert!(owner == Some(cache_a) || owner == Some(cache_b));
//! ```

use std::time::Duration;

#[cfg(feature = "derive")]
use serde::{Deserialize, Serialize};

mod hashring;
pub mod hasher;
mod node;

pub use hashring::{AddReport, HashRange, HashRing, HashRingIterator, Placement, SEPARATOR};
pub use hasher::{BuildHasherFunction, HashFunction, Md5HashFunction, SipHashFunction};
pub use node::{KeyProvider, Node, PhysicalNode, RandomKeyProvider};

/// How an operation acquires the ring lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub enum Acquire {
    /// Attempt once; report [`Error::LockUnavailable`] if the lock is held in a conflicting mode.
    #[default]
    Try,
    /// Wait until the lock is granted.
    Block,
    /// Wait for at most the given duration, then report [`Error::LockTimeout`].
    Timeout(Duration),
}

/// What happens when a new placement hashes onto an occupied slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub enum Collision {
    /// The new placement replaces the existing one.
    #[default]
    Overwrite,
    /// The existing placement stays, the new one is dropped.
    KeepExisting,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "derive", serde(default))]
pub struct Config {
    pub acquire: Acquire,
    pub on_collision: Collision,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("ring lock is held by another caller")]
    LockUnavailable,
    #[error("ring lock could not be acquired within {0:?}")]
    LockTimeout(Duration),
    #[error("unknown hash function: {0}")]
    UnknownHashFunction(String),
}

impl Error {
    /// True if the operation failed only because the lock was contended, i.e. a retry may succeed.
    pub fn is_contended(&self) -> bool {
        matches!(self, Error::LockUnavailable | Error::LockTimeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{Acquire, Collision, Config, Error};

    #[test]
    fn default_config_fails_fast_and_overwrites() {
        let config = Config::default();

        assert_eq!(config.acquire, Acquire::Try);
        assert_eq!(config.on_collision, Collision::Overwrite);
    }

    #[test]
    fn contention_errors_are_retryable() {
        assert!(Error::LockUnavailable.is_contended());
        assert!(Error::LockTimeout(Duration::from_millis(5)).is_contended());
        assert!(!Error::InvalidArgument("overflow".to_string()).is_contended());
        assert!(!Error::UnknownHashFunction("crc".to_string()).is_contended());
    }

    #[test]
    fn errors_render_their_cause() {
        assert_eq!(
            "unknown hash function: crc",
            Error::UnknownHashFunction("crc".to_string()).to_string()
        );
        assert_eq!(
            "ring lock could not be acquired within 5ms",
            Error::LockTimeout(Duration::from_millis(5)).to_string()
        );
    }
}
