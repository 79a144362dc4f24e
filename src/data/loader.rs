// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads a semi-supervised corpus from a single JSON file.
//
// File layout (keys other than the labelled pair are optional):
//
//   {
//     "x_labelled":   [[[f32; input_dim]; seq_len]; N],
//     "y_labelled":   [usize; N],
//     "x_unlabelled": [[[f32; input_dim]; seq_len]; U],
//     "x_test":       [[[f32; input_dim]; seq_len]; M],
//     "y_test":       [usize; M]
//   }
//
// Shapes are not checked here; `Corpus::validate` does that
// once the preprocessor has run.
//
// Reference: serde / serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::corpus::Corpus;
use crate::domain::sequence::{LabelledSequence, Sequence};
use crate::domain::traits::CorpusSource;

/// On-disk representation of a corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    pub x_labelled:   Vec<Vec<Vec<f32>>>,
    pub y_labelled:   Vec<usize>,
    #[serde(default)]
    pub x_unlabelled: Vec<Vec<Vec<f32>>>,
    #[serde(default)]
    pub x_test:       Vec<Vec<Vec<f32>>>,
    #[serde(default)]
    pub y_test:       Vec<usize>,
}

impl CorpusFile {
    /// Pair up features and labels into a domain Corpus.
    pub fn into_corpus(self) -> Result<Corpus> {
        let labelled = pair(self.x_labelled, self.y_labelled, "labelled")?;
        let test     = pair(self.x_test, self.y_test, "test")?;
        let unlabelled = self.x_unlabelled.into_iter().map(Sequence::new).collect();
        Ok(Corpus::new(labelled, unlabelled, test))
    }

    pub fn from_corpus(corpus: &Corpus) -> Self {
        let (x_labelled, y_labelled) = unpair(&corpus.labelled);
        let (x_test, y_test)         = unpair(&corpus.test);
        Self {
            x_labelled,
            y_labelled,
            x_unlabelled: corpus.unlabelled.iter().map(|s| s.steps.clone()).collect(),
            x_test,
            y_test,
        }
    }
}

fn pair(xs: Vec<Vec<Vec<f32>>>, ys: Vec<usize>, pool: &str) -> Result<Vec<LabelledSequence>> {
    if xs.len() != ys.len() {
        bail!("{pool}: {} sequences but {} labels", xs.len(), ys.len());
    }
    Ok(xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| LabelledSequence::new(Sequence::new(x), y))
        .collect())
}

fn unpair(items: &[LabelledSequence]) -> (Vec<Vec<Vec<f32>>>, Vec<usize>) {
    items
        .iter()
        .map(|s| (s.sequence.steps.clone(), s.label))
        .unzip()
}

/// Reads a corpus JSON file. Implements the CorpusSource trait from Layer 3.
pub struct JsonCorpusLoader {
    path: PathBuf,
}

impl JsonCorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `corpus` to this loader's path, creating parent directories.
    pub fn save(&self, corpus: &Corpus) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create '{}'", parent.display()))?;
            }
        }
        let json = serde_json::to_string(&CorpusFile::from_corpus(corpus))?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write corpus to '{}'", self.path.display()))?;
        tracing::info!("Wrote corpus to '{}'", self.path.display());
        Ok(())
    }
}

impl CorpusSource for JsonCorpusLoader {
    fn load(&self) -> Result<Corpus> {
        let json = fs::read_to_string(&self.path).with_context(|| {
            format!(
                "Cannot read corpus '{}'. Run 'generate' to create a synthetic one.",
                self.path.display()
            )
        })?;
        let file: CorpusFile = serde_json::from_str(&json)
            .with_context(|| format!("Malformed corpus JSON in '{}'", self.path.display()))?;
        let corpus = file.into_corpus()?;

        tracing::info!(
            "Loaded corpus: {} labelled, {} unlabelled, {} test",
            corpus.labelled.len(),
            corpus.unlabelled.len(),
            corpus.test.len()
        );
        Ok(corpus)
    }
}
