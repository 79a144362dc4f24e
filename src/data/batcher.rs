// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SequenceItem>
// into tensors on the requested device.
//
// How batching works here:
//   Input:  N items, each a flat Vec of seq_len * input_dim
//   Output: inputs tensor of shape [N, seq_len, input_dim]
//
//   All items are concatenated into one long Vec, then reshaped:
//   [s1_t1_f1, ..., s1_tT_fF, s2_t1_f1, ..., sN_tT_fF] → [N, T, F]
//
// Targets are only produced when every item carries a label.
// Unlabelled batches feed the adversarial term alone.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SequenceItem;

// ─── SequenceBatch ────────────────────────────────────────────────────────────
/// A batch of sequences ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Input features — shape: [batch_size, seq_len, input_dim]
    pub inputs: Tensor<B, 3>,

    /// Class indices — shape: [batch_size], None for unlabelled batches
    pub targets: Option<Tensor<B, 1, Int>>,
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
/// Knows the per-item shape so flat features can be reshaped.
#[derive(Clone, Debug)]
pub struct SequenceBatcher {
    pub seq_len:   usize,
    pub input_dim: usize,
}

impl SequenceBatcher {
    pub fn new(seq_len: usize, input_dim: usize) -> Self {
        Self { seq_len, input_dim }
    }
}

impl<B: Backend> Batcher<B, SequenceItem, SequenceBatch<B>> for SequenceBatcher {
    fn batch(&self, items: Vec<SequenceItem>, device: &B::Device) -> SequenceBatch<B> {
        let batch_size = items.len();

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|item| item.features.iter().copied())
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
            .reshape([batch_size, self.seq_len, self.input_dim]);

        // Some only if no item is missing its label
        let labels: Option<Vec<i64>> = items
            .iter()
            .map(|item| item.label.map(|l| l as i64))
            .collect();

        let targets = labels.map(|labels| {
            Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device)
        });

        SequenceBatch { inputs, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn item(features: Vec<f32>, label: Option<usize>) -> SequenceItem {
        SequenceItem { features, label }
    }

    #[test]
    fn test_labelled_batch_shapes() {
        let device  = Default::default();
        let batcher = SequenceBatcher::new(2, 3);
        let batch: SequenceBatch<TestBackend> = batcher.batch(
            vec![item(vec![0.0; 6], Some(1)), item(vec![1.0; 6], Some(4))],
            &device,
        );

        assert_eq!(batch.inputs.dims(), [2, 2, 3]);
        let targets = batch.targets.expect("labelled batch has targets");
        let values: Vec<i64> = targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(values, vec![1, 4]);
    }

    #[test]
    fn test_layout_is_sample_then_time_then_feature() {
        let device  = Default::default();
        let batcher = SequenceBatcher::new(2, 2);
        let batch: SequenceBatch<TestBackend> = batcher.batch(
            vec![item(vec![1.0, 2.0, 3.0, 4.0], None)],
            &device,
        );
        // Second time step of the first sample
        let step: Vec<f32> = batch.inputs
            .slice([0..1, 1..2, 0..2])
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(step, vec![3.0, 4.0]);
    }

    #[test]
    fn test_any_missing_label_drops_targets() {
        let device  = Default::default();
        let batcher = SequenceBatcher::new(1, 1);
        let batch: SequenceBatch<TestBackend> = batcher.batch(
            vec![item(vec![0.0], Some(0)), item(vec![0.0], None)],
            &device,
        );
        assert!(batch.targets.is_none());
    }
}
