//! Hash functions that place keys and virtual nodes on the ring.
//!
//! A hash function must be deterministic for the lifetime of a ring. Implementations
//! here hold no mutable state: every call builds a fresh hasher or digest.

use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

use md5::{Digest, Md5};
use siphasher::sip::SipHasher;

use crate::{Error, Result};

pub trait HashFunction: Send + Sync {
    fn hash(&self, key: &str) -> u64;
}

impl HashFunction for Box<dyn HashFunction> {
    fn hash(&self, key: &str) -> u64 {
        (**self).hash(key)
    }
}

impl<H: HashFunction + ?Sized> HashFunction for Arc<H> {
    fn hash(&self, key: &str) -> u64 {
        (**self).hash(key)
    }
}

/// SipHash over the raw key bytes, with zero keys so placements are stable across processes.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SipHashFunction;

impl HashFunction for SipHashFunction {
    fn hash(&self, key: &str) -> u64 {
        let mut hasher = SipHasher::new();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// MD5 of the key, reduced to its first four digest bytes read big-endian.
///
/// Positions fall in `0..2^32`, which keeps placements compatible with rings that
/// place nodes on a 32 bit MD5 circle.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Md5HashFunction;

impl HashFunction for Md5HashFunction {
    fn hash(&self, key: &str) -> u64 {
        let digest = Md5::digest(key.as_bytes());
        u64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
    }
}

/// Adapts any [`BuildHasher`] into a ring hash function.
///
/// # Examples
///
/// ```
/// use consistent_hashring::{BuildHasherFunction, HashFunction};
/// use siphasher::sip::SipHasher;
/// use std::hash::BuildHasher;
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct DefaultHashBuilder;
///
/// impl BuildHasher for DefaultHashBuilder {
///     type Hasher = SipHasher;
///
///     fn build_hasher(&self) -> Self::Hasher {
///         SipHasher::new()
///     }
/// }
///
/// let hash_function = BuildHasherFunction(DefaultHashBuilder);
/// assert_eq!(hash_function.hash("foo"), hash_function.hash("foo"));
/// ```
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BuildHasherFunction<S>(pub S);

impl<S> HashFunction for BuildHasherFunction<S>
where
    S: BuildHasher + Send + Sync,
{
    fn hash(&self, key: &str) -> u64 {
        self.0.hash_one(key)
    }
}

/// Select a hash function by name, e.g. from a configuration file.
///
/// Known names are `sip` (alias `siphash`) and `md5`, case insensitive.
/// Unknown names fail here, before any ring is built with them.
pub fn by_name(name: &str) -> Result<Box<dyn HashFunction>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sip" | "siphash" => Ok(Box::new(SipHashFunction)),
        "md5" => Ok(Box::new(Md5HashFunction)),
        _ => Err(Error::UnknownHashFunction(name.to_string())),
    }
}
