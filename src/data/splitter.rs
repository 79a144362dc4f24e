// ============================================================
// Layer 4 — Seeded Splitter
// ============================================================
// Shuffles items and splits them into two sets. Used to:
//   - hold out a test split when the corpus ships without one
//   - keep only N labelled samples and move the rest into the
//     unlabelled pool (their labels are dropped)
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom with a
// seeded StdRng, so a given seed always produces the same split.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `items` and split into (first, rest) where `first`
/// holds `round(len * fraction)` items.
pub fn split_train_val<T>(items: Vec<T>, fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let split_at = ((items.len() as f64) * fraction).round() as usize;
    split_at_count(items, split_at, seed)
}

/// Shuffle `items` and split into (first `count`, rest).
/// `count` larger than the input keeps everything in the first set.
pub fn split_at_count<T>(mut items: Vec<T>, count: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = count.min(items.len());
    let rest     = items.split_off(split_at);

    tracing::debug!("Split: {} / {}", items.len(), rest.len());
    (items, rest)
}
