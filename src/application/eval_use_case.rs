// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Re-scores a trained checkpoint on the held-out split:
//
//   Step 1: Read train_config.json + model_config.json   (Layer 6)
//   Step 2: Load and prepare the corpus exactly as the
//           training run did (same seed → same test split) (Layer 4)
//   Step 3: Rebuild the model and load the latest weights  (Layer 6)
//   Step 4: Evaluate on the test split                     (Layer 5)

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu},
    data::dataloader::DataLoaderBuilder,
    prelude::*,
};

use crate::application::train_use_case::{prepare_corpus, DeviceKind};
use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset, loader::JsonCorpusLoader};
use crate::domain::traits::CorpusSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{evaluate, EvalReport};
use crate::ml::model::{RnnClassifier, RnnClassifierConfig};

pub struct EvalUseCase {
    checkpoint_dir: String,
    data_path:      Option<String>,
    device:         Option<DeviceKind>,
}

impl EvalUseCase {
    /// `data_path` and `device` fall back to the values saved at train time.
    pub fn new(checkpoint_dir: String, data_path: Option<String>, device: Option<DeviceKind>) -> Self {
        Self { checkpoint_dir, data_path, device }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        // ── Step 1 ────────────────────────────────────────────────────────────
        let ckpt      = CheckpointManager::new(&self.checkpoint_dir)?;
        let train_cfg = ckpt.load_config()?;
        let model_cfg = ckpt.load_model_config()?;

        // ── Step 2 ────────────────────────────────────────────────────────────
        let data_path = self.data_path.clone().unwrap_or_else(|| train_cfg.data_path.clone());
        let corpus    = JsonCorpusLoader::new(&data_path).load()?;
        let corpus    = prepare_corpus(corpus, &train_cfg)?;
        let (seq_len, input_dim) = corpus.validate(model_cfg.num_classes)?;

        if input_dim != model_cfg.input_dim {
            bail!(
                "Corpus '{}' has input_dim {} but the checkpoint expects {}",
                data_path, input_dim, model_cfg.input_dim
            );
        }
        tracing::info!("Evaluating on {} test samples from '{}'", corpus.test.len(), data_path);

        let test       = SequenceDataset::from_labelled(&corpus.test);
        let batch_size = train_cfg.eval_batch_size;

        // ── Steps 3–4 ─────────────────────────────────────────────────────────
        let report = match self.device.unwrap_or(train_cfg.device) {
            DeviceKind::Wgpu => evaluate_checkpoint::<Wgpu>(
                &ckpt, &model_cfg, test, seq_len, batch_size, WgpuDevice::default(),
            )?,
            DeviceKind::Cpu => evaluate_checkpoint::<NdArray>(
                &ckpt, &model_cfg, test, seq_len, batch_size, NdArrayDevice::default(),
            )?,
        };

        tracing::info!(
            "Test accuracy {:.4} ({}/{}), mean loss {:.4}",
            report.accuracy(), report.correct, report.total, report.mean_loss()
        );
        Ok(report)
    }
}

fn evaluate_checkpoint<B: Backend>(
    ckpt:       &CheckpointManager,
    model_cfg:  &RnnClassifierConfig,
    test:       SequenceDataset,
    seq_len:    usize,
    batch_size: usize,
    device:     B::Device,
) -> Result<EvalReport> {
    let model: RnnClassifier<B> = model_cfg.init(&device);
    let model = ckpt.load_model(model, &device)?;

    let loader = DataLoaderBuilder::<B, _, _>::new(SequenceBatcher::new(seq_len, model_cfg.input_dim))
        .batch_size(batch_size)
        .set_device(device)
        .build(test);

    Ok(evaluate(&model, &loader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::data::synthetic::{SyntheticConfig, SyntheticCorpus};

    #[test]
    fn test_eval_without_checkpoint_fails() {
        let dir = std::env::temp_dir().join(format!("rnn_vat_eval_empty_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let use_case = EvalUseCase::new(dir.display().to_string(), None, Some(DeviceKind::Cpu));
        assert!(use_case.execute().is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_train_then_eval_scores_whole_test_split() {
        let dir = std::env::temp_dir().join(format!("rnn_vat_eval_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();

        let corpus = SyntheticCorpus::new(SyntheticConfig {
            num_classes:      3,
            seq_len:          5,
            input_dim:        2,
            labelled_count:   12,
            unlabelled_count: 8,
            test_count:       9,
            noise:            0.1,
            seed:             11,
        })
        .load()
        .unwrap();
        let data_path = dir.join("corpus.json");
        JsonCorpusLoader::new(&data_path).save(&corpus).unwrap();

        let ckpt_dir = dir.join("ckpt").display().to_string();
        let cfg = TrainConfig {
            data_path:       data_path.display().to_string(),
            checkpoint_dir:  ckpt_dir.clone(),
            num_classes:     3,
            hidden_size:     6,
            batch_size:      4,
            eval_batch_size: 4,
            epochs:          2,
            device:          DeviceKind::Cpu,
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute().unwrap();

        let report = EvalUseCase::new(ckpt_dir, None, None).execute().unwrap();
        assert_eq!(report.total, 9);
        assert_eq!(report.batches, 3);
        assert!((0.0..=1.0).contains(&report.accuracy()));

        std::fs::remove_dir_all(&dir).ok();
    }
}
