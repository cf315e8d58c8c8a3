#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use raster_index::{entries_from_keys, Entry};
use std::ops::Range;

/// `n` distinct keys drawn from `[lo, lo + span)`, in random input order.
pub fn distinct_random_entries(n: usize, lo: i32, span: u32, seed: u64) -> Vec<Entry> {
    assert!(n as u64 <= span as u64, "cannot draw {} distinct keys from {}", n, span);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let offsets = rand::seq::index::sample(&mut rng, span as usize, n);
    let mut keys: Vec<i32> = offsets.iter().map(|o| lo + o as i32).collect();
    keys.shuffle(&mut rng);
    entries_from_keys(keys)
}

/// Dense keys `lo..lo + n`, shuffled.
pub fn dense_entries(n: usize, lo: i32, seed: u64) -> Vec<Entry> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keys: Vec<i32> = (0..n as i32).map(|i| lo + i).collect();
    keys.shuffle(&mut rng);
    entries_from_keys(keys)
}

/// Keys with repeats: `n` draws from `[lo, lo + span)`.
pub fn entries_with_duplicates(n: usize, lo: i32, span: u32, seed: u64) -> Vec<Entry> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let keys: Vec<i32> = (0..n).map(|_| lo + rng.gen_range(0..span) as i32).collect();
    entries_from_keys(keys)
}

/// Entries with the last occurrence of each key kept, in input order.
pub fn last_writer_entries(entries: &[Entry]) -> Vec<Entry> {
    let mut last = std::collections::HashMap::new();
    for e in entries {
        last.insert(e.key, e.row_id);
    }
    entries
        .iter()
        .filter(|e| last.get(&e.key) == Some(&e.row_id))
        .copied()
        .collect()
}

/// Random half-open key ranges inside the padded span `[min_key, max_key + 1]`.
pub fn random_key_ranges(count: usize, min_key: i64, max_key: i64, seed: u64) -> Vec<Range<i64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let a = rng.gen_range(min_key..=max_key + 1);
            let b = rng.gen_range(min_key..=max_key + 1);
            a.min(b)..a.max(b)
        })
        .collect()
}
