// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for a Corpus without knowing
// where it comes from:
//   - JsonCorpusLoader → reads a corpus file from disk
//   - SyntheticCorpus  → generates a seeded toy corpus
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::corpus::Corpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce a semi-supervised corpus.
pub trait CorpusSource {
    /// Load (or build) the full corpus.
    fn load(&self) -> Result<Corpus>;
}
