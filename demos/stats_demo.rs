use std::hash::BuildHasher;
use std::hash::RandomState;

use clap::Parser;
use clap::ValueEnum;
use probe_hash::HashTable;
use probe_hash::LinearProbing;
use probe_hash::Probe;
use probe_hash::QuadraticProbing;
use probe_hash::hash_table::Entry;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Probing {
    Linear,
    Quadratic,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'p', long, value_enum, default_value_t = Probing::Linear)]
    probing: Probing,

    /// Fraction of entries to remove and replace with fresh keys after the
    /// initial fill.
    #[arg(long, default_value_t = 0.5)]
    churn: f64,
}

fn run<P: Probe>(args: &Args) {
    let hasher = RandomState::new();

    println!(
        "Creating {:?}-probed table with target capacity: {}",
        args.probing, args.target_capacity
    );
    let mut table: HashTable<u64, P> = HashTable::with_capacity_and_probing(args.target_capacity);
    println!(
        "Actual capacity: {} ({} slots)",
        table.capacity(),
        table.physical_len()
    );

    let num_values = table.capacity() as u64;
    for value in 0..num_values {
        match table.entry(hasher.hash_one(value), |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => panic!("Value already exists in table: {}", value),
        }
    }

    println!("Inserted {} values into table", table.len());
    table.debug_stats().print();
    table.print_probe_histogram();

    let churned = (num_values as f64 * args.churn.clamp(0.0, 1.0)) as u64;
    for value in 0..churned {
        table.remove(hasher.hash_one(value), |&v| v == value);
        let fresh = num_values + value;
        table
            .entry(hasher.hash_one(fresh), |&v| v == fresh)
            .or_insert(fresh);
    }

    println!();
    println!("After replacing {} entries:", churned);
    table.debug_stats().print();
    table.print_probe_histogram();
}

fn main() {
    let args = Args::parse();
    match args.probing {
        Probing::Linear => run::<LinearProbing>(&args),
        Probing::Quadratic => run::<QuadraticProbing>(&args),
    }
}
