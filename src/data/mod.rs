// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a corpus on disk to tensor batches.
//
//   corpus.json / SyntheticCorpus
//       │
//       ▼
//   JsonCorpusLoader  → reads the file into a Corpus
//       │
//       ▼
//   Preprocessor      → optional edge trimming
//       │
//       ▼
//   splitter          → labelled/unlabelled and train/test splits
//       │
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SequenceBatcher   → stacks items into [batch, seq_len, input_dim]
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads and writes the JSON corpus format
pub mod loader;

/// Seeded toy corpus generator
pub mod synthetic;

/// Shape-level cleanup applied to every pool
pub mod preprocessor;

/// Implements Burn's Dataset trait for sequences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle-and-split helpers
pub mod splitter;
