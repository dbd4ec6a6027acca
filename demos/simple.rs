//! basic example to showcase the main functions of HashRing

extern crate consistent_hashring;

use consistent_hashring::{HashRing, Node, PhysicalNode, SipHashFunction};

fn main() {
    let ring = HashRing::new(SipHashFunction);
    let nodes = vec![
        PhysicalNode::new("127.0.0.1:11211"),
        PhysicalNode::new("127.0.0.2:11211"),
        PhysicalNode::new("127.0.0.3:11211"),
    ];

    for node in &nodes {
        if let Err(error) = ring.add_node(node, 100) {
            eprintln!("could not add {node}: {error}");
        }
    }

    // return the node that stores the key 'foo'
    println!("node for key foo: {:?}", ring.choose_node("foo"));

    // return the hash ranges each node is responsible for
    match ring.hash_ranges() {
        Ok(ranges) => println!("cluster is split into {} hash ranges", ranges.len()),
        Err(error) => eprintln!("could not read the ring: {error}"),
    }

    // keep a copy of the membership to see which keys move once a node joins
    let previous = HashRing::new(SipHashFunction);
    for node in &nodes {
        if let Err(error) = previous.add_node(node, 100) {
            eprintln!("could not add {node} to the copy: {error}");
        }
    }

    let new_node = PhysicalNode::new("127.0.0.4:11211");
    if let Err(error) = ring.add_node(&new_node, 100) {
        eprintln!("could not add {new_node}: {error}");
    }

    // hash ranges (and therefore keys) that now belong to the new node
    if let Ok(moved) = ring.reassigned_ranges(&previous) {
        println!(
            "{} hash ranges moved, all to {}",
            moved.len(),
            new_node.key()
        );
    }

    println!(
        "{:?} physical nodes, {:?} virtual nodes",
        ring.total_physical_node_count(),
        ring.total_virtual_node_count()
    );
}
