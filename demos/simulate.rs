//! Seeds a population of peers with random values, then looks random keys up.
//!
//! Run: `cargo run --example simulate -- --peers 100 --values 200 --lookups 100`

use clap::Parser;
use kadstore::{Bytes, Id, Peer, Swarm};
use rand::{seq::SliceRandom, Rng};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of peers
    #[arg(long, default_value_t = 100)]
    peers: usize,
    /// Number of random values to store
    #[arg(long, default_value_t = 200)]
    values: usize,
    /// Number of random lookups
    #[arg(long, default_value_t = 100)]
    lookups: usize,
    /// Give every peer its own routing table, knowing a few random other peers
    #[arg(long)]
    swarm: bool,
    /// Log level
    #[arg(long, default_value_t = Level::INFO)]
    log: Level,
}

fn main() {
    let mut cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log).init();

    if !clamp_population(&mut cli) {
        eprintln!("Nothing to simulate with --peers 0");
        return;
    }

    let mut rng = rand::thread_rng();

    let values: Vec<Bytes> = (0..cli.values)
        .map(|_| {
            let mut value = vec![0; rng.gen_range(1..=100)];
            rng.fill(&mut value[..]);
            Bytes::from(value)
        })
        .collect();
    let keys: Vec<Id> = values.iter().map(|v| Id::from_content(v)).collect();

    if cli.swarm {
        simulate_swarm(&cli, &keys, &values);
    } else {
        simulate_peers(&cli, &keys, &values);
    }
}

fn simulate_peers(cli: &Cli, keys: &[Id], values: &[Bytes]) {
    let mut rng = rand::thread_rng();
    let peers: Vec<Peer> = (0..cli.peers).map(|i| Peer::new(format!("node{i}"))).collect();

    for (key, value) in keys.iter().zip(values) {
        let peer = peers.choose(&mut rng).expect("at least one peer");
        peer.store(key, value.clone());
    }

    for _ in 0..cli.lookups {
        let key = keys.choose(&mut rng).expect("at least one value");
        let peer = peers.choose(&mut rng).expect("at least one peer");

        report(peer.id(), key, peer.lookup(key));
    }

    let (key, value) = hello();
    let peer = &peers[1 % peers.len()];
    peer.store(&key, value);
    report(peer.id(), &key, peer.lookup(&key));

    println!("\nPeer {} bucket contents:", peer.id());
    peer.print_bucket_contents();
}

fn simulate_swarm(cli: &Cli, keys: &[Id], values: &[Bytes]) {
    let mut rng = rand::thread_rng();
    let mut swarm = Swarm::new();
    let ids: Vec<Id> = (0..cli.peers).map(|_| Id::random()).collect();

    for id in &ids {
        swarm.add_peer(id.clone()).expect("random ids are unique");
    }
    for peer in swarm.peers() {
        for known in ids.choose_multiple(&mut rng, 20) {
            peer.insert_node(known.clone());
        }
    }

    for (key, value) in keys.iter().zip(values) {
        let from = ids.choose(&mut rng).expect("at least one peer");
        swarm
            .store(from, key, value.clone())
            .expect("valid key and known peer");
    }

    let mut found = 0;
    for _ in 0..cli.lookups {
        let key = keys.choose(&mut rng).expect("at least one value");
        let from = ids.choose(&mut rng).expect("at least one peer");

        let value = swarm.lookup(from, key).expect("known peer");
        if value.is_some() {
            found += 1;
        }
        report(from, key, value);
    }

    println!("\nFound {found} of {} lookups", cli.lookups);
}

/// Returns `false` when there are no peers to simulate. Lookups need at least one value.
fn clamp_population(cli: &mut Cli) -> bool {
    if cli.values == 0 {
        cli.lookups = 0;
    }

    cli.peers > 0
}

fn hello() -> (Id, Bytes) {
    let value = Bytes::from_static(b"hello");
    (Id::from_content(&value), value)
}

fn report(peer: &Id, key: &Id, value: Option<Bytes>) {
    match value {
        Some(value) => println!("Node {} retrieved value {:x?} for key {}", peer, &value[..], key),
        None => println!("Node {} could not retrieve value for key {}", peer, key),
    }
}
