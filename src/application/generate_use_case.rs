// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Writes a seeded synthetic corpus in the JSON layout that
// `train` and `eval` read.

use std::path::PathBuf;

use anyhow::Result;

use crate::data::{loader::JsonCorpusLoader, synthetic::{SyntheticConfig, SyntheticCorpus}};
use crate::domain::corpus::Corpus;
use crate::domain::traits::CorpusSource;

pub struct GenerateUseCase {
    config: SyntheticConfig,
    output: PathBuf,
}

impl GenerateUseCase {
    pub fn new(config: SyntheticConfig, output: impl Into<PathBuf>) -> Self {
        Self { config, output: output.into() }
    }

    /// Generate, save, and return the corpus that was written.
    pub fn execute(&self) -> Result<Corpus> {
        let corpus = SyntheticCorpus::new(self.config.clone()).load()?;
        JsonCorpusLoader::new(&self.output).save(&corpus)?;

        tracing::info!(
            "Wrote {} labelled, {} unlabelled, {} test sequences to '{}'",
            corpus.labelled.len(),
            corpus.unlabelled.len(),
            corpus.test.len(),
            self.output.display()
        );
        Ok(corpus)
    }
}
