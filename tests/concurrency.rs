use lookup_cache::Cache;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::thread;

fn assert_consistent<V: Clone>(cache: &Cache<String, V>) {
    let keys = cache.keys();
    assert!(keys.len() <= cache.capacity());
    assert_eq!(keys.len(), cache.len());
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    for k in &keys {
        assert!(cache.contains_key(k.as_str()));
    }
}

#[test]
fn every_writer_reads_its_key_back() {
    let cache = Cache::new(26).unwrap();
    let threads = 8;
    let actions = 10_000;

    thread::scope(|scope| {
        for t in 0..threads {
            let cache = cache.clone();
            scope.spawn(move || {
                for i in (t..actions).step_by(threads) {
                    let key = format!("key_{}", i % 26);
                    cache.set(key.clone(), format!("value_{}", i));
                    // 26 distinct keys fit, nothing is ever evicted
                    assert!(cache.get(&key).is_some(), "lost {}", key);
                }
            });
        }
    });

    assert_eq!(cache.len(), 26);
    assert_eq!(cache.stats().evictions, 0);
    assert_consistent(&cache);
}

#[test]
fn random_mix_keeps_invariants() {
    let capacity = 16;
    let cache = Cache::new(capacity).unwrap();

    thread::scope(|scope| {
        for t in 0..8u64 {
            let cache = cache.clone();
            scope.spawn(move || {
                let mut rng = rand::rngs::StdRng::seed_from_u64(t);
                for i in 0..5_000u64 {
                    let key = format!("k{}", rng.gen_range(0..64));
                    match rng.gen_range(0..10) {
                        0..=4 => {
                            cache.get(&key);
                        }
                        5..=8 => cache.set(key, i),
                        _ => {
                            cache.remove(&key);
                        }
                    }
                    assert!(cache.len() <= capacity);
                }
            });
        }
    });

    assert_consistent(&cache);
    let stats = cache.stats();
    assert_eq!(stats.len, cache.len());
    assert!(stats.hits + stats.misses > 0);
}

#[test]
fn last_writer_wins_per_key() {
    let cache = Cache::new(4).unwrap();
    thread::scope(|scope| {
        for t in 0..4u32 {
            let cache = cache.clone();
            scope.spawn(move || {
                for i in 0..1_000u32 {
                    cache.set(format!("own_{}", t), i);
                }
            });
        }
    });
    for t in 0..4 {
        assert_eq!(cache.get(format!("own_{}", t).as_str()), Some(999));
    }
    assert_consistent(&cache);
}
