//! Micro-benchmarks for RoutingTable operations and queries: insert, contains,
//! remove, store and lookup at varying table sizes. Reports nanoseconds-per-operation.
//!
//! Run: `cargo bench --bench routing_table`

use std::time::Instant;

use kadstore::{Bytes, Config, Id, Node, Peer, RoutingTable};

fn main() {
    println!("routing_table\n");

    bench_insert();
    bench_contains();
    bench_remove();
    bench_store_lookup();
}

fn bench_insert() {
    println!("insert");

    for bucket_size in [3, 20] {
        // Pre-generate random ids outside the timed section
        let ids: Vec<_> = (0..10_000).map(|_| Id::random()).collect();

        let table = RoutingTable::new().with_bucket_size(bucket_size);
        let start = Instant::now();
        for id in ids.iter().cloned() {
            table.insert(Node::Peer(id));
        }
        let per_op = start.elapsed().as_nanos() / ids.len() as u128;
        println!(
            "k={bucket_size:>2}: {per_op}ns/op (final size: {})",
            table.size()
        );
    }

    println!();
}

fn bench_contains() {
    println!("contains");

    let table = RoutingTable::new().with_bucket_size(20);
    let ids: Vec<_> = (0..1000).map(|_| Id::random()).collect();
    for id in ids.iter().cloned() {
        table.insert(Node::Peer(id));
    }

    let start = Instant::now();
    let found = ids.iter().filter(|id| table.contains(id)).count();
    let per_op = start.elapsed().as_nanos() / ids.len() as u128;
    println!("{per_op}ns/op ({found} of {} still present)", ids.len());
    println!();
}

fn bench_remove() {
    println!("remove");

    let table = RoutingTable::new().with_bucket_size(20);
    let ids: Vec<_> = (0..200).map(|_| Id::random()).collect();
    for id in ids.iter().cloned() {
        table.insert(Node::Peer(id));
    }

    let start = Instant::now();
    for id in &ids {
        table.remove(id);
    }
    let per_op = start.elapsed().as_nanos() / ids.len() as u128;
    println!("{per_op}ns/op ({} removals)", ids.len());
    println!();
}

fn bench_store_lookup() {
    println!("store/lookup");

    for peers in [10, 100, 1000] {
        let config = Config {
            bucket_size: peers,
            ..Default::default()
        };
        // All in bucket 63.
        let origin = Peer::with_config(u64::MAX.to_string(), config);
        for i in 0..peers as u64 {
            origin.insert_node((u64::MAX - 1 - i).to_string());
        }

        let values: Vec<_> = (0..1000)
            .map(|i| Bytes::from(format!("value {i}")))
            .collect();
        let keys: Vec<_> = values.iter().map(|v| Id::from_content(v)).collect();

        let start = Instant::now();
        for (key, value) in keys.iter().zip(values.iter().cloned()) {
            origin.store(key, value);
        }
        let store_per_op = start.elapsed().as_nanos() / keys.len() as u128;

        let start = Instant::now();
        for key in &keys {
            let _ = origin.lookup(key);
        }
        let lookup_per_op = start.elapsed().as_nanos() / keys.len() as u128;

        println!("{peers:>4} peers: store {store_per_op}ns/op, lookup {lookup_per_op}ns/op");
    }

    println!();
}
