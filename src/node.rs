use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "derive")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that can be placed on the ring.
///
/// The key is the node's identity: it seeds the placement of its virtual nodes and
/// is the only thing compared when the ring decides whether two nodes are the same.
/// It must not change while the node is a member of a ring.
pub trait Node {
    fn key(&self) -> &str;
}

impl<T: Node + ?Sized> Node for Arc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }
}

impl<T: Node + ?Sized> Node for &T {
    fn key(&self) -> &str {
        (**self).key()
    }
}

/// Strategy producing identity keys for new nodes.
pub trait KeyProvider {
    fn key(&self) -> String;
}

/// Generates a random (UUID v4) identity for every node.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomKeyProvider;

impl KeyProvider for RandomKeyProvider {
    fn key(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// A physical server on the ring, identified by its key only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "derive", derive(Serialize, Deserialize))]
pub struct PhysicalNode {
    key: String,
}

impl PhysicalNode {
    pub fn new(key: impl Into<String>) -> PhysicalNode {
        PhysicalNode { key: key.into() }
    }

    /// Create a node whose identity is chosen by `provider`.
    pub fn from_provider<P: KeyProvider + ?Sized>(provider: &P) -> PhysicalNode {
        PhysicalNode::new(provider.key())
    }

    /// Create a node with a random identity.
    pub fn random() -> PhysicalNode {
        PhysicalNode::from_provider(&RandomKeyProvider)
    }
}

impl Node for PhysicalNode {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Hash for PhysicalNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Display for PhysicalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PhysicalNode[{}]", self.key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{KeyProvider, Node, PhysicalNode};
    use crate::{HashRing, SipHashFunction};

    struct HostnameKeyProvider {
        host: &'static str,
        port: u16,
    }

    impl KeyProvider for HostnameKeyProvider {
        fn key(&self) -> String {
            format!("{}:{}", self.host, self.port)
        }
    }

    #[test]
    fn identity_is_the_key() {
        let node = PhysicalNode::new("10.0.0.1:11211");

        assert_eq!("10.0.0.1:11211", node.key());
        assert_eq!(PhysicalNode::new("10.0.0.1:11211"), node);
        assert_ne!(PhysicalNode::new("10.0.0.2:11211"), node);
        assert_eq!("PhysicalNode[10.0.0.1:11211]", node.to_string());
    }

    #[test]
    fn random_identities_are_unique() {
        let keys: HashSet<String> = (0..1_000)
            .map(|_| PhysicalNode::random().key().to_string())
            .collect();

        assert_eq!(1_000, keys.len());
    }

    #[test]
    fn identity_can_come_from_a_custom_provider() {
        let provider = HostnameKeyProvider {
            host: "cache-1.internal",
            port: 11211,
        };

        let node = PhysicalNode::from_provider(&provider);
        assert_eq!("cache-1.internal:11211", node.key());
    }

    #[test]
    fn shared_nodes_expose_the_inner_key() {
        let node = Arc::new(PhysicalNode::new("shared"));

        assert_eq!("shared", node.key());
    }

    #[test]
    fn borrowed_nodes_can_be_placed_on_a_ring() {
        let nodes = [PhysicalNode::new("a"), PhysicalNode::new("b")];
        let ring: HashRing<&PhysicalNode, _> = HashRing::new(SipHashFunction);

        for node in &nodes {
            assert_eq!(Ok(true), ring.add_node(&node, 8));
        }

        let owner = ring.choose_node("key").unwrap().unwrap();
        assert!(std::ptr::eq(owner, &nodes[0]) || std::ptr::eq(owner, &nodes[1]));

        assert_eq!(Ok(true), ring.remove_node(&&nodes[0]));
        assert_eq!(Ok(8), ring.total_virtual_node_count());
        assert_eq!(Ok(Some(&nodes[1])), ring.choose_node("key"));
    }
}
