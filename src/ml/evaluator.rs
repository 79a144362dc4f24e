// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs a model over every batch of a data loader and counts
// correct predictions. Called on `model.valid()` (inner
// backend), so state dropout is inactive.

use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
};

use crate::data::batcher::SequenceBatch;
use crate::ml::model::RnnClassifier;

/// Accumulated evaluation counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalReport {
    pub correct:  usize,
    pub total:    usize,
    pub loss_sum: f64,
    pub batches:  usize,
}

impl EvalReport {
    /// Fraction correct, 0.0 when nothing was evaluated
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }

    /// Mean per-batch cross-entropy, NaN when nothing was evaluated
    pub fn mean_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }
}

/// Number of rows where argmax(logits) == targets.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

/// Evaluate `model` on every labelled batch of `loader`.
/// Batches without targets are skipped.
pub fn evaluate<B: Backend>(
    model:  &RnnClassifier<B>,
    loader: &Arc<dyn DataLoader<B, SequenceBatch<B>>>,
) -> EvalReport {
    let mut report = EvalReport::default();

    for batch in loader.iter() {
        let Some(targets) = batch.targets else { continue };
        let logits = model.forward(batch.inputs);

        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());

        report.loss_sum += loss.into_scalar().elem::<f64>();
        report.batches  += 1;
        report.total    += targets.dims()[0];
        report.correct  += count_correct(logits, targets);
    }

    report
}
