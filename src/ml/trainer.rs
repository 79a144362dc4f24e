// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop over labelled batches (each paired with an
// unlabelled batch when that pool is non-empty), Adam with
// per-value gradient clipping, periodic held-out evaluation.
//
// Per batch:
//   loss = CE(f(x_l), y) + KL(f(x) ‖ f(x + r_adv))   x = x_l ∪ x_u
//   θ    = Adam(θ, clip(∇θ loss, -c, c))
//
// Evaluation runs every `eval_every` epochs (epoch 0 included)
// and on the last epoch. Each evaluation also writes a checkpoint.
//
// Key Burn insight:
//   - Training uses Autodiff<Backend> for gradients
//   - model.valid() returns the model on the inner backend,
//     where Dropout is a no-op
//   - the test loader must therefore batch on B::InnerBackend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::io::Write;

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{grad_clipping::GradientClippingConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::evaluator::{count_correct, evaluate};
use crate::ml::model::{RnnClassifier, RnnClassifierConfig};

type WgpuTrainBackend = Autodiff<Wgpu>;
type CpuTrainBackend  = Autodiff<NdArray>;

/// Datasets plus the shared per-item shape.
pub struct TrainingData {
    pub seq_len:    usize,
    pub input_dim:  usize,
    pub labelled:   SequenceDataset,
    pub unlabelled: SequenceDataset,
    pub test:       SequenceDataset,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainingSummary {
    pub epochs_run:      usize,
    pub final_train_acc: f64,
    pub final_test_acc:  f64,
    pub best_test_acc:   f64,
}

/// Running sums over one epoch.
#[derive(Debug, Default)]
struct EpochStats {
    loss:        f64,
    supervised:  f64,
    adversarial: f64,
    batches:     usize,
    correct:     usize,
    total:       usize,
}

impl EpochStats {
    fn mean(&self, sum: f64) -> f64 {
        if self.batches > 0 { sum / self.batches as f64 } else { f64::NAN }
    }

    fn accuracy(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }
}

pub fn run_training(
    cfg:          &TrainConfig,
    model_cfg:    &RnnClassifierConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
) -> Result<TrainingSummary> {
    match cfg.device {
        DeviceKind::Wgpu => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<WgpuTrainBackend>(cfg, model_cfg, data, ckpt_manager, device)
        }
        DeviceKind::Cpu => {
            let device = NdArrayDevice::default();
            tracing::info!("Using CPU device: {:?}", device);
            train_loop::<CpuTrainBackend>(cfg, model_cfg, data, ckpt_manager, device)
        }
    }
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    model_cfg:    &RnnClassifierConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
    device:       B::Device,
) -> Result<TrainingSummary> {
    B::seed(&device, cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: RnnClassifier<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: GRU {} → {} hidden → {} classes",
        model_cfg.input_dim, model_cfg.hidden_size, model_cfg.num_classes
    );

    // ── Adam optimiser with value clipping ────────────────────────────────────
    // every gradient entry is clamped to [-clip, clip] before the update
    let mut optim = AdamConfig::new()
        .with_grad_clipping(Some(GradientClippingConfig::Value(cfg.grad_clip)))
        .init();
    let vat = cfg.vat_config();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let batcher = SequenceBatcher::new(data.seq_len, data.input_dim);

    let train_loader = DataLoaderBuilder::<B, _, _>::new(batcher.clone())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(data.labelled);

    let unlabelled_loader = if data.unlabelled.is_empty() {
        None
    } else {
        Some(
            DataLoaderBuilder::<B, _, _>::new(batcher.clone())
                .batch_size(cfg.batch_size)
                .shuffle(cfg.seed.wrapping_add(1))
                .num_workers(1)
                .set_device(device.clone())
                .build(data.unlabelled),
        )
    };

    // InnerBackend — no autodiff overhead, no dropout
    let test_loader = DataLoaderBuilder::<B::InnerBackend, _, _>::new(batcher)
        .batch_size(cfg.eval_batch_size)
        .num_workers(1)
        .set_device(device.clone())
        .build(data.test);

    let metrics     = MetricsLogger::new(ckpt_manager.dir())?;
    let mut summary = TrainingSummary::default();

    if cfg.epochs == 0 {
        tracing::warn!("epochs is 0, nothing to train");
    }

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        let mut stats = EpochStats::default();
        let mut unlabelled_batches = unlabelled_loader.as_ref().map(|loader| loader.iter());

        for batch in train_loader.iter() {
            let Some(targets) = batch.targets else { continue };

            // Pair with the next unlabelled batch, restarting the pool when it runs out
            let extra = match (unlabelled_loader.as_ref(), unlabelled_batches.as_mut()) {
                (Some(loader), Some(batches)) => match batches.next() {
                    Some(u) => Some(u.inputs),
                    None => {
                        *batches = loader.iter();
                        batches.next().map(|u| u.inputs)
                    }
                },
                _ => None,
            };

            let output = model.forward_training(batch.inputs, targets.clone(), extra, &vat);

            stats.loss        += output.loss.clone().into_scalar().elem::<f64>();
            stats.supervised  += output.supervised.clone().into_scalar().elem::<f64>();
            stats.adversarial += output.adversarial.clone().into_scalar().elem::<f64>();
            stats.batches     += 1;
            stats.total       += targets.dims()[0];
            stats.correct     += count_correct(output.logits.clone(), targets);

            // Backward pass + clipped Adam update
            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let train_acc = stats.accuracy();
        summary.epochs_run      = epoch + 1;
        summary.final_train_acc = train_acc;

        // ── Evaluation ────────────────────────────────────────────────────────
        let evaluate_now = epoch % cfg.eval_every == 0 || epoch + 1 == cfg.epochs;
        let test_acc = if evaluate_now {
            let report   = evaluate(&model.valid(), &test_loader);
            let test_acc = report.accuracy();
            summary.final_test_acc = test_acc;
            summary.best_test_acc  = summary.best_test_acc.max(test_acc);

            println!("\r {} train {:.4} test {:.4}", epoch, train_acc, test_acc);
            tracing::debug!(
                "epoch {} | loss={:.4} (ce={:.4}, vat={:.4}) | test_loss={:.4}",
                epoch,
                stats.mean(stats.loss),
                stats.mean(stats.supervised),
                stats.mean(stats.adversarial),
                report.mean_loss(),
            );

            ckpt_manager.save_model(&model, epoch)?;
            Some(test_acc)
        } else {
            print!("\r {} train {:.4}", epoch, train_acc);
            std::io::stdout().flush().ok();
            None
        };

        metrics.log(&EpochMetrics {
            epoch,
            loss:             stats.mean(stats.loss),
            supervised_loss:  stats.mean(stats.supervised),
            adversarial_loss: stats.mean(stats.adversarial),
            train_acc,
            test_acc,
        })?;
    }

    tracing::info!(
        "Training complete: train_acc={:.4}, test_acc={:.4}, best_test_acc={:.4}",
        summary.final_train_acc,
        summary.final_test_acc,
        summary.best_test_acc
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{SyntheticConfig, SyntheticCorpus};
    use crate::domain::traits::CorpusSource;

    fn tiny_data(unlabelled_count: usize) -> TrainingData {
        synthetic_data(10, unlabelled_count, 6)
    }

    fn synthetic_data(labelled_count: usize, unlabelled_count: usize, test_count: usize) -> TrainingData {
        let corpus = SyntheticCorpus::new(SyntheticConfig {
            num_classes:      3,
            seq_len:          4,
            input_dim:        3,
            labelled_count,
            unlabelled_count,
            test_count,
            noise:            0.1,
            seed:             3,
        })
        .load()
        .unwrap();
        TrainingData {
            seq_len:    4,
            input_dim:  3,
            labelled:   SequenceDataset::from_labelled(&corpus.labelled),
            unlabelled: SequenceDataset::from_unlabelled(&corpus.unlabelled),
            test:       SequenceDataset::from_labelled(&corpus.test),
        }
    }

    fn tiny_config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            checkpoint_dir:  dir.display().to_string(),
            num_classes:     3,
            hidden_size:     8,
            batch_size:      4,
            eval_batch_size: 5,
            epochs:          3,
            eval_every:      2,
            device:          DeviceKind::Cpu,
            ..TrainConfig::default()
        }
    }

    fn run(name: &str, unlabelled_count: usize) -> (TrainingSummary, std::path::PathBuf) {
        let dir  = std::env::temp_dir().join(format!("rnn_vat_trainer_{name}_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let cfg  = tiny_config(&dir);
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let model_cfg = cfg.model_config(3);

        let summary = train_loop::<CpuTrainBackend>(
            &cfg, &model_cfg, tiny_data(unlabelled_count), &ckpt, NdArrayDevice::default(),
        )
        .unwrap();
        (summary, dir)
    }

    #[test]
    fn test_train_loop_runs_and_checkpoints() {
        let (summary, dir) = run("ckpt", 7);

        assert_eq!(summary.epochs_run, 3);
        assert!((0.0..=1.0).contains(&summary.final_train_acc));
        assert!((0.0..=1.0).contains(&summary.final_test_acc));
        assert!(summary.best_test_acc >= summary.final_test_acc);

        // Evaluated at epochs 0 and 2 (the last one)
        let ckpt = CheckpointManager::new(&dir).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        let csv = std::fs::read_to_string(dir.join("metrics.csv")).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[2].ends_with(','), "epoch 1 has no test accuracy");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_train_loop_without_unlabelled_pool() {
        let (summary, dir) = run("supervised_only", 0);
        assert_eq!(summary.epochs_run, 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_separable_corpus_is_learned() {
        let dir = std::env::temp_dir().join(format!("rnn_vat_trainer_learns_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let cfg = TrainConfig {
            hidden_size:     16,
            learning_rate:   1e-2,
            epsilon:         1.0,
            batch_size:      8,
            eval_batch_size: 30,
            epochs:          20,
            eval_every:      5,
            ..tiny_config(&dir)
        };
        let ckpt      = CheckpointManager::new(&dir).unwrap();
        let model_cfg = cfg.model_config(3);

        let summary = train_loop::<CpuTrainBackend>(
            &cfg, &model_cfg, synthetic_data(32, 16, 30), &ckpt, NdArrayDevice::default(),
        )
        .unwrap();

        // Three classes: chance is 1/3
        assert!(summary.best_test_acc >= 0.6, "best test accuracy {}", summary.best_test_acc);

        // supervised_loss is the third CSV column
        let csv = std::fs::read_to_string(dir.join("metrics.csv")).unwrap();
        let supervised: Vec<f64> = csv
            .lines()
            .skip(1)
            .map(|row| row.split(',').nth(2).unwrap().parse().unwrap())
            .collect();
        assert_eq!(supervised.len(), 20);
        assert!(
            supervised[19] < supervised[0],
            "supervised loss went from {} to {}", supervised[0], supervised[19]
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
