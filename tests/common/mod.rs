#![allow(dead_code)]

use std::collections::HashMap;

use consistent_hashring::{HashFunction, HashRing, Node, PhysicalNode};
use rand::{Rng, distr::Alphanumeric};
use tracing_subscriber::EnvFilter;

/// Route ring logs to the test output, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn random_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

pub fn random_keys(count: usize) -> Vec<String> {
    (0..count).map(|_| random_key()).collect()
}

/// Resolve every key and return the identity of its owner.
pub fn owners<H: HashFunction>(
    ring: &HashRing<PhysicalNode, H>,
    keys: &[String],
) -> Vec<String> {
    keys.iter()
        .map(|key| {
            ring.choose_node(key)
                .expect("ring lock is uncontended in this test")
                .expect("ring has nodes")
                .key()
                .to_string()
        })
        .collect()
}

pub fn distribution(owners: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for owner in owners {
        *counts.entry(owner.as_str()).or_insert(0) += 1;
    }
    counts
}
