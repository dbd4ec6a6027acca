#[cfg(feature = "derive")]
#[cfg(test)]
mod tests {
    use std::time::Duration;

    use consistent_hashring::{
        Acquire, Collision, Config, HashRange, HashRing, PhysicalNode, Placement,
        SipHashFunction,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_and_deserialize_hash_ranges() {
        let original = HashRange {
            hash_range: 0..=10,
            node: PhysicalNode::new("node1"),
        };

        // Serialize the `HashRange` instance to JSON
        let serialized = serde_json::to_string(&original).expect("Serialization failed");

        // Deserialize the JSON string back into a `HashRange` instance
        let deserialized: HashRange<PhysicalNode> =
            serde_json::from_str(&serialized).expect("Deserialization failed");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_config_from_json() {
        let config: Config = serde_json::from_str(
            r#"{"acquire": {"Timeout": {"secs": 0, "nanos": 5000000}}, "on_collision": "KeepExisting"}"#,
        )
        .expect("Deserialization failed");

        assert_eq!(
            Config {
                acquire: Acquire::Timeout(Duration::from_millis(5)),
                on_collision: Collision::KeepExisting,
            },
            config
        );

        // missing fields fall back to the defaults
        let config: Config = serde_json::from_str("{}").expect("Deserialization failed");
        assert_eq!(Config::default(), config);
    }

    #[test]
    fn test_export_ring_snapshot() {
        let ring = HashRing::new(SipHashFunction);
        ring.add_node(&PhysicalNode::new("node1"), 3).unwrap();
        ring.add_node(&PhysicalNode::new("node2"), 3).unwrap();

        let placements = ring.placements().unwrap();
        let serialized = serde_json::to_string(&placements).expect("Serialization failed");
        let deserialized: Vec<Placement<PhysicalNode>> =
            serde_json::from_str(&serialized).expect("Deserialization failed");

        assert_eq!(placements, deserialized);
    }
}
