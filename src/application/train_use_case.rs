// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the corpus               (Layer 4 - data)
//   Step 2: Preprocess sequences          (Layer 4 - data)
//   Step 3: Hold out a test split         (Layer 4 - data)
//   Step 4: Shrink labelled pool          (Layer 4 - data)
//   Step 5: Validate shapes and labels    (Layer 3 - domain)
//   Step 6: Build Burn datasets           (Layer 4 - data)
//   Step 7: Save configs                  (Layer 6 - infra)
//   Step 8: Run training loop             (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SequenceDataset,
    loader::JsonCorpusLoader,
    preprocessor::Preprocessor,
    splitter::{split_at_count, split_train_val},
};
use crate::domain::corpus::Corpus;
use crate::domain::traits::CorpusSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::RnnClassifierConfig;
use crate::ml::trainer::{run_training, TrainingData, TrainingSummary};
use crate::ml::vat::VatConfig;

/// Where tensors live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Wgpu,
    Cpu,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints and
// reloaded by the `eval` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:            String,
    pub checkpoint_dir:       String,
    pub num_classes:          usize,
    pub hidden_size:          usize,
    pub state_keep_prob:      f64,
    pub learning_rate:        f64,
    pub num_power_iterations: usize,
    pub xi:                   f64,
    pub epsilon:              f64,
    pub grad_clip:            f32,
    pub batch_size:           usize,
    pub eval_batch_size:      usize,
    pub epochs:               usize,
    pub eval_every:           usize,
    pub trim_edges:           bool,
    pub labelled_count:       Option<usize>,
    pub use_unlabelled:       bool,
    pub seed:                 u64,
    pub device:               DeviceKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:            "data/semi_supervised.json".to_string(),
            checkpoint_dir:       "checkpoints".to_string(),
            num_classes:          10,
            hidden_size:          256,
            state_keep_prob:      0.9,
            learning_rate:        1e-3,
            num_power_iterations: 1,
            xi:                   0.1,
            epsilon:              5.0,
            grad_clip:            1.0,
            batch_size:           16,
            eval_batch_size:      1000,
            epochs:               10000,
            eval_every:           200,
            trim_edges:           false,
            labelled_count:       None,
            use_unlabelled:       true,
            seed:                 42,
            device:               DeviceKind::Wgpu,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would make training meaningless or panic.
    pub fn validate(&self) -> Result<()> {
        if self.num_classes < 2 {
            bail!("num_classes must be at least 2, got {}", self.num_classes);
        }
        if self.hidden_size == 0 || self.batch_size == 0 || self.eval_batch_size == 0 {
            bail!("hidden_size, batch_size and eval_batch_size must be non-zero");
        }
        if !(self.state_keep_prob > 0.0 && self.state_keep_prob <= 1.0) {
            bail!("state_keep_prob must be in (0, 1], got {}", self.state_keep_prob);
        }
        if self.eval_every == 0 {
            bail!("eval_every must be non-zero");
        }
        if self.grad_clip <= 0.0 {
            bail!("grad_clip must be positive, got {}", self.grad_clip);
        }
        Ok(())
    }

    pub fn vat_config(&self) -> VatConfig {
        VatConfig::new()
            .with_num_power_iterations(self.num_power_iterations)
            .with_xi(self.xi)
            .with_epsilon(self.epsilon)
    }

    pub fn model_config(&self, input_dim: usize) -> RnnClassifierConfig {
        RnnClassifierConfig::new(input_dim, self.num_classes)
            .with_hidden_size(self.hidden_size)
            .with_state_dropout(1.0 - self.state_keep_prob)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        let corpus = JsonCorpusLoader::new(&cfg.data_path).load()?;

        // ── Steps 2–5 ─────────────────────────────────────────────────────────
        let corpus = prepare_corpus(corpus, cfg)?;
        let (seq_len, input_dim) = corpus.validate(cfg.num_classes)?;
        tracing::info!(
            "Corpus ready: {} labelled, {} unlabelled, {} test, shape [{}, {}]",
            corpus.labelled.len(),
            corpus.unlabelled.len(),
            corpus.test.len(),
            seq_len,
            input_dim
        );

        // ── Step 6: Build Burn datasets ───────────────────────────────────────
        let data = TrainingData {
            seq_len,
            input_dim,
            labelled:   SequenceDataset::from_labelled(&corpus.labelled),
            unlabelled: SequenceDataset::from_unlabelled(&corpus.unlabelled),
            test:       SequenceDataset::from_labelled(&corpus.test),
        };

        // ── Step 7: Save configs for evaluation ───────────────────────────────
        let model_cfg    = cfg.model_config(input_dim);
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_model_config(&model_cfg)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, &model_cfg, data, &ckpt_manager)
    }
}

/// Preprocess, make sure a test split exists, then optionally
/// shrink the labelled pool.
pub fn prepare_corpus(corpus: Corpus, cfg: &TrainConfig) -> Result<Corpus> {
    let mut corpus = Preprocessor::new(cfg.trim_edges).apply(corpus);

    // No test split shipped: hold out 20% of the full labelled pool.
    if corpus.test.is_empty() {
        let (train, test) = split_train_val(std::mem::take(&mut corpus.labelled), 0.8, cfg.seed);
        tracing::warn!("Corpus has no test split; holding out {} labelled samples", test.len());
        corpus.labelled = train;
        corpus.test     = test;
    }
    if corpus.test.is_empty() {
        bail!(
            "No test samples: the corpus has no test split and only {} labelled samples to carve one from",
            corpus.labelled.len()
        );
    }

    // Keep only N labelled samples; the rest lose their labels.
    if let Some(n) = cfg.labelled_count {
        if n == 0 {
            bail!("labelled_count must be at least 1");
        }
        let (kept, moved) = split_at_count(std::mem::take(&mut corpus.labelled), n, cfg.seed);
        tracing::info!("Keeping {} labelled samples, {} moved to unlabelled", kept.len(), moved.len());
        corpus.labelled = kept;
        corpus.unlabelled.extend(moved.into_iter().map(|s| s.sequence));
    }

    if !cfg.use_unlabelled {
        corpus.unlabelled.clear();
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{SyntheticConfig, SyntheticCorpus};

    fn corpus(test_count: usize) -> Corpus {
        corpus_with(20, test_count)
    }

    fn corpus_with(labelled_count: usize, test_count: usize) -> Corpus {
        SyntheticCorpus::new(SyntheticConfig {
            num_classes:      3,
            seq_len:          6,
            input_dim:        2,
            labelled_count,
            unlabelled_count: 5,
            test_count,
            noise:            0.1,
            seed:             1,
        })
        .load()
        .unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_keep_prob_rejected() {
        let cfg = TrainConfig { state_keep_prob: 0.0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_config_maps_keep_prob_to_dropout() {
        let m = TrainConfig::default().model_config(30);
        assert_eq!(m.input_dim, 30);
        assert_eq!(m.num_classes, 10);
        assert!((m.state_dropout - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_labelled_count_moves_rest_to_unlabelled() {
        let cfg = TrainConfig { labelled_count: Some(4), num_classes: 3, ..TrainConfig::default() };
        let out = prepare_corpus(corpus(5), &cfg).unwrap();
        assert_eq!(out.labelled.len(), 4);
        assert_eq!(out.unlabelled.len(), 5 + 16);
        assert_eq!(out.test.len(), 5);
    }

    #[test]
    fn test_missing_test_split_is_carved_from_labelled() {
        let cfg = TrainConfig { num_classes: 3, ..TrainConfig::default() };
        let out = prepare_corpus(corpus(0), &cfg).unwrap();
        assert_eq!(out.labelled.len(), 16);
        assert_eq!(out.test.len(), 4);
    }

    #[test]
    fn test_labelled_count_applies_after_test_split_is_carved() {
        let cfg = TrainConfig { labelled_count: Some(10), num_classes: 3, ..TrainConfig::default() };
        let out = prepare_corpus(corpus_with(50, 0), &cfg).unwrap();
        assert_eq!(out.test.len(), 10);
        assert_eq!(out.labelled.len(), 10);
        assert_eq!(out.unlabelled.len(), 5 + 30);
    }

    #[test]
    fn test_empty_test_split_is_an_error() {
        let cfg = TrainConfig { num_classes: 3, ..TrainConfig::default() };
        let err = prepare_corpus(corpus_with(1, 0), &cfg).unwrap_err();
        assert!(err.to_string().contains("No test samples"));
    }

    #[test]
    fn test_unlabelled_pool_can_be_disabled() {
        let cfg = TrainConfig { use_unlabelled: false, num_classes: 3, ..TrainConfig::default() };
        let out = prepare_corpus(corpus(5), &cfg).unwrap();
        assert!(out.unlabelled.is_empty());
    }

    #[test]
    fn test_trim_edges_applied() {
        let cfg = TrainConfig { trim_edges: true, num_classes: 3, ..TrainConfig::default() };
        let out = prepare_corpus(corpus(5), &cfg).unwrap();
        assert_eq!(out.validate(3).unwrap(), (4, 2));
    }
}
