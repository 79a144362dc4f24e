use burn::data::dataset::Dataset;

use crate::domain::sequence::{LabelledSequence, Sequence};

/// One flattened sequence ready for batching.
/// `features` has length seq_len * input_dim (time-major).
#[derive(Debug, Clone)]
pub struct SequenceItem {
    pub features: Vec<f32>,
    pub label:    Option<usize>,
}

impl SequenceItem {
    pub fn labelled(s: &LabelledSequence) -> Self {
        Self { features: s.sequence.flatten(), label: Some(s.label) }
    }

    pub fn unlabelled(s: &Sequence) -> Self {
        Self { features: s.flatten(), label: None }
    }
}

#[derive(Debug, Clone)]
pub struct SequenceDataset {
    items: Vec<SequenceItem>,
}

impl SequenceDataset {
    pub fn new(items: Vec<SequenceItem>) -> Self { Self { items } }

    pub fn from_labelled(samples: &[LabelledSequence]) -> Self {
        Self::new(samples.iter().map(SequenceItem::labelled).collect())
    }

    pub fn from_unlabelled(samples: &[Sequence]) -> Self {
        Self::new(samples.iter().map(SequenceItem::unlabelled).collect())
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl Dataset<SequenceItem> for SequenceDataset {
    fn get(&self, index: usize) -> Option<SequenceItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
