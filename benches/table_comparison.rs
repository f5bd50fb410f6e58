use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::BenchmarkGroup;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::measurement::WallTime;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use probe_hash::HashTable;
use probe_hash::LinearProbing;
use probe_hash::Probe;
use probe_hash::QuadraticProbing;
use probe_hash::hash_table::Entry;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct StringTestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for StringTestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn random_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let item = T::new(rng.try_next_u64().unwrap());
            (item.hash_key(), item)
        })
        .collect()
}

fn shuffled<T: Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.shuffle(&mut SmallRng::from_os_rng());
    items
}

fn insert_into<T: KeyValuePair, P: Probe>(table: &mut HashTable<T, P>, hash: u64, item: T) {
    match table.entry(hash, |v| v.eq_key(&item)) {
        Entry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        Entry::Occupied(mut entry) => {
            *entry.get_mut() = item;
        }
    }
}

fn insert_into_hashbrown<T: KeyValuePair>(table: &mut HashbrownHashTable<T>, hash: u64, item: T) {
    match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
        HashbrownEntry::Vacant(entry) => {
            black_box(entry.insert(item));
        }
        HashbrownEntry::Occupied(mut entry) => {
            *entry.get_mut() = item;
        }
    }
}

fn insert_random_probe<T: KeyValuePair, P: Probe>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    items: &[(u64, T)],
) {
    group.bench_function(name, |b| {
        b.iter_batched(
            || shuffled(items),
            |items| {
                let mut table = HashTable::<T, P>::with_probing();
                for (hash, item) in items {
                    insert_into(&mut table, hash, item);
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_random<T: KeyValuePair>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let items = random_items::<T>(size);
        group.throughput(Throughput::Elements(size as u64));

        insert_random_probe::<T, LinearProbing>(&mut group, "linear", &items);
        insert_random_probe::<T, QuadraticProbing>(&mut group, "quadratic", &items);
        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || shuffled(&items),
                |items| {
                    let mut table = HashbrownHashTable::with_capacity(0);
                    for (hash, item) in items {
                        insert_into_hashbrown(&mut table, hash, item);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn find_hit_miss_probe<T: KeyValuePair, P: Probe>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    present: &[(u64, T)],
    probes: &[(u64, T)],
) {
    let mut table = HashTable::<T, P>::with_capacity_and_probing(present.len());
    for (hash, item) in present.iter().cloned() {
        insert_into(&mut table, hash, item);
    }

    group.bench_function(name, |b| {
        b.iter(|| {
            for (hash, item) in probes {
                black_box(table.find(*hash, |v| v.eq_key(item)));
            }
        })
    });
}

fn bench_find_hit_miss<T: KeyValuePair>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let present = random_items::<T>(size);
        let mut probes = random_items::<T>(size);
        probes.extend(present.iter().cloned());
        let probes = shuffled(&probes);
        group.throughput(Throughput::Elements(probes.len() as u64));

        find_hit_miss_probe::<T, LinearProbing>(&mut group, "linear", &present, &probes);
        find_hit_miss_probe::<T, QuadraticProbing>(&mut group, "quadratic", &present, &probes);

        let mut table = HashbrownHashTable::with_capacity(size);
        for (hash, item) in present.iter().cloned() {
            insert_into_hashbrown(&mut table, hash, item);
        }
        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                for (hash, item) in &probes {
                    black_box(table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn churn_probe<T: KeyValuePair, P: Probe>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    ops: &[(u64, T)],
) {
    group.bench_function(name, |b| {
        b.iter_batched(
            || shuffled(ops),
            |ops| {
                let mut table = HashTable::<T, P>::with_probing();
                for (hash, item) in ops {
                    match table.entry(hash, |v| v.eq_key(&item)) {
                        Entry::Vacant(entry) => {
                            entry.insert(item);
                        }
                        Entry::Occupied(entry) => {
                            black_box(entry.remove());
                        }
                    }
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

/// Every key is inserted and removed once, in random order, so the table
/// accumulates tombstones throughout.
fn bench_churn<T: KeyValuePair>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let ops = (0..size as u64)
            .flat_map(|key| {
                let item = T::new(key);
                let hash = item.hash_key();
                [(hash, item.clone()), (hash, item)]
            })
            .collect::<Vec<(u64, T)>>();
        group.throughput(Throughput::Elements(ops.len() as u64));

        churn_probe::<T, LinearProbing>(&mut group, "linear", &ops);
        churn_probe::<T, QuadraticProbing>(&mut group, "quadratic", &ops);
        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || shuffled(&ops),
                |ops| {
                    let mut table = HashbrownHashTable::<T>::with_capacity(0);
                    for (hash, item) in ops {
                        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(entry) => {
                                black_box(entry.remove().0);
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn zipf_operations(count: usize, exponent: f64) -> Vec<Operation> {
    let mut rng = SmallRng::from_os_rng();
    let op_distr = Zipf::new(3.0, exponent).unwrap();
    (0..count)
        .map(|_| {
            let op_choice: f64 = rng.sample(op_distr);
            if op_choice <= 1.0 {
                Operation::Find
            } else if op_choice <= 2.0 {
                Operation::Insert
            } else {
                Operation::Remove
            }
        })
        .collect()
}

fn mixed_zipf_probe<T: KeyValuePair, P: Probe>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    operations: &[Operation],
    key_space: usize,
) {
    let mut rng = SmallRng::from_os_rng();
    let key_distr = Zipf::new(key_space as f32 - 1.0, 1.0).unwrap();

    group.bench_function(name, |b| {
        b.iter_batched(
            || shuffled(operations),
            |operations| {
                let mut table = HashTable::<T, P>::with_probing();
                for operation in operations {
                    let item = T::new(rng.sample(key_distr) as u64);
                    let hash = item.hash_key();
                    match operation {
                        Operation::Insert => insert_into(&mut table, hash, item),
                        Operation::Remove => {
                            black_box(table.remove(hash, |v| v.eq_key(&item)));
                        }
                        Operation::Find => {
                            black_box(table.find(hash, |v| v.eq_key(&item)));
                        }
                    }
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_mixed_probabilistic_zipf<T: KeyValuePair>(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "mixed_probabilistic_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<T>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        for &size in SIZES {
            let operations = zipf_operations(size * 3, exponent);
            let key_space = size * 2;
            group.throughput(Throughput::Elements(operations.len() as u64));

            mixed_zipf_probe::<T, LinearProbing>(&mut group, "linear", &operations, key_space);
            mixed_zipf_probe::<T, QuadraticProbing>(
                &mut group,
                "quadratic",
                &operations,
                key_space,
            );

            let mut rng = SmallRng::from_os_rng();
            let key_distr = Zipf::new(key_space as f32 - 1.0, 1.0).unwrap();
            group.bench_function("hashbrown", |b| {
                b.iter_batched(
                    || shuffled(&operations),
                    |operations| {
                        let mut table = HashbrownHashTable::<T>::with_capacity(0);
                        for operation in operations {
                            let item = T::new(rng.sample(key_distr) as u64);
                            let hash = item.hash_key();
                            match operation {
                                Operation::Insert => {
                                    insert_into_hashbrown(&mut table, hash, item)
                                }
                                Operation::Remove => {
                                    let result =
                                        match table.find_entry(hash, |v| v.eq_key(&item)) {
                                            Ok(entry) => Some(entry.remove().0),
                                            Err(_) => None,
                                        };
                                    black_box(result);
                                }
                                Operation::Find => {
                                    black_box(table.find(hash, |v| v.eq_key(&item)));
                                }
                            }
                        }
                        black_box(table)
                    },
                    BatchSize::SmallInput,
                )
            });
        }

        group.finish();
    }
}

fn iteration_probe<T: KeyValuePair, P: Probe>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    items: &[(u64, T)],
) {
    let mut table = HashTable::<T, P>::with_probing();
    for (hash, item) in items.iter().cloned() {
        insert_into(&mut table, hash, item);
    }
    // Remove every other entry so iteration has to skip tombstones.
    table.retain({
        let mut keep = false;
        move |_| {
            keep = !keep;
            keep
        }
    });

    group.bench_function(name, |b| {
        b.iter(|| {
            for item in table.iter() {
                black_box(item);
            }
        })
    });
}

fn bench_iteration<T: KeyValuePair>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<T>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let items = random_items::<T>(size);
        group.throughput(Throughput::Elements(size as u64 / 2));

        iteration_probe::<T, LinearProbing>(&mut group, "linear", &items);
        iteration_probe::<T, QuadraticProbing>(&mut group, "quadratic", &items);
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem>,
    bench_insert_random::<StringTestItem>,
    bench_find_hit_miss::<SmallTestItem>,
    bench_find_hit_miss::<StringTestItem>,
    bench_churn::<SmallTestItem>,
    bench_churn::<StringTestItem>,
    bench_mixed_probabilistic_zipf::<SmallTestItem>,
    bench_mixed_probabilistic_zipf::<StringTestItem>,
    bench_iteration::<SmallTestItem>,
    bench_iteration::<StringTestItem>,
);

criterion_main!(benches);
