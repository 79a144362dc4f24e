// ============================================================
// Layer 4 — Sequence Preprocessor
// ============================================================
// Applies the same shape-level cleanup to every pool of a
// corpus before it is batched.
//
// Currently one step is supported:
//   trim_edges — drop the first and last time step of every
//                sequence. Corpora stored with a one-step
//                border on the time axis (e.g. 30 rows of a
//                padded 28-row image) are fed as the inner 28.
//
// Training and evaluation must use the same preprocessor
// settings, so the flag is persisted in TrainConfig.

use crate::domain::corpus::Corpus;

#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    trim_edges: bool,
}

impl Preprocessor {
    pub fn new(trim_edges: bool) -> Self {
        Self { trim_edges }
    }

    /// Return the cleaned corpus.
    pub fn apply(&self, corpus: Corpus) -> Corpus {
        if !self.trim_edges {
            return corpus;
        }
        tracing::debug!("Trimming first and last time step of every sequence");
        corpus.map_sequences(|s| s.trim_edges())
    }
}
