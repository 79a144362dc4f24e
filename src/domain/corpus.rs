// ============================================================
// Layer 3 — Corpus Domain Type
// ============================================================
// A semi-supervised corpus has three pools:
//   - labelled:   sequences with a class index (drive both losses)
//   - unlabelled: sequences without a label (VAT term only)
//   - test:       held-out labelled sequences (evaluation only)
//
// Every sequence in every pool must share one shape
// [seq_len, input_dim]; the recurrent encoder is built for a
// fixed input width and the batcher stacks without padding.

use anyhow::{bail, Result};

use crate::domain::sequence::{LabelledSequence, Sequence};

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub labelled:   Vec<LabelledSequence>,
    pub unlabelled: Vec<Sequence>,
    pub test:       Vec<LabelledSequence>,
}

impl Corpus {
    pub fn new(
        labelled:   Vec<LabelledSequence>,
        unlabelled: Vec<Sequence>,
        test:       Vec<LabelledSequence>,
    ) -> Self {
        Self { labelled, unlabelled, test }
    }

    /// Check that the corpus is usable for a `num_classes`-way classifier.
    ///
    /// Returns the common `(seq_len, input_dim)`.
    pub fn validate(&self, num_classes: usize) -> Result<(usize, usize)> {
        let first = match self.labelled.first() {
            Some(s) => &s.sequence,
            None    => bail!("corpus has no labelled sequences"),
        };
        let shape = (first.seq_len(), first.input_dim());
        if shape.0 == 0 || shape.1 == 0 {
            bail!("labelled sequence 0 is empty (shape {:?})", shape);
        }

        let pools: [(&str, Vec<&Sequence>); 3] = [
            ("labelled",   self.labelled.iter().map(|s| &s.sequence).collect()),
            ("unlabelled", self.unlabelled.iter().collect()),
            ("test",       self.test.iter().map(|s| &s.sequence).collect()),
        ];
        for (pool, sequences) in &pools {
            for (i, s) in sequences.iter().enumerate() {
                if !s.is_rectangular() {
                    bail!("{pool} sequence {i} has ragged time steps");
                }
                if (s.seq_len(), s.input_dim()) != shape {
                    bail!(
                        "{pool} sequence {i} has shape {:?}, expected {:?}",
                        (s.seq_len(), s.input_dim()),
                        shape
                    );
                }
            }
        }

        for (pool, items) in [("labelled", &self.labelled), ("test", &self.test)] {
            if let Some((i, s)) = items.iter().enumerate().find(|(_, s)| s.label >= num_classes) {
                bail!("{pool} sequence {i} has label {} but num_classes is {num_classes}", s.label);
            }
        }

        Ok(shape)
    }

    /// Apply `f` to every sequence in every pool.
    pub fn map_sequences(self, f: impl Fn(&Sequence) -> Sequence) -> Corpus {
        Corpus {
            labelled: self.labelled
                .into_iter()
                .map(|s| LabelledSequence::new(f(&s.sequence), s.label))
                .collect(),
            unlabelled: self.unlabelled.iter().map(&f).collect(),
            test: self.test
                .into_iter()
                .map(|s| LabelledSequence::new(f(&s.sequence), s.label))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(label: usize, seq_len: usize, dim: usize) -> LabelledSequence {
        LabelledSequence::new(Sequence::new(vec![vec![0.5; dim]; seq_len]), label)
    }

    #[test]
    fn test_validate_returns_shape() {
        let c = Corpus::new(
            vec![labelled(0, 4, 3), labelled(1, 4, 3)],
            vec![Sequence::new(vec![vec![0.0; 3]; 4])],
            vec![labelled(2, 4, 3)],
        );
        assert_eq!(c.validate(3).unwrap(), (4, 3));
    }

    #[test]
    fn test_validate_rejects_empty_labelled_pool() {
        let c = Corpus::default();
        assert!(c.validate(10).is_err());
    }

    #[test]
    fn test_validate_rejects_shape_mismatch() {
        let c = Corpus::new(vec![labelled(0, 4, 3)], Vec::new(), vec![labelled(0, 5, 3)]);
        let err = c.validate(2).unwrap_err().to_string();
        assert!(err.contains("test sequence 0"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_label() {
        let c = Corpus::new(vec![labelled(7, 2, 2)], Vec::new(), Vec::new());
        assert!(c.validate(5).is_err());
        assert!(c.validate(8).is_ok());
    }

    #[test]
    fn test_map_sequences_touches_every_pool() {
        let c = Corpus::new(
            vec![labelled(0, 4, 1)],
            vec![Sequence::new(vec![vec![0.0]; 4])],
            vec![labelled(1, 4, 1)],
        );
        let trimmed = c.map_sequences(|s| s.trim_edges());
        assert_eq!(trimmed.labelled[0].sequence.seq_len(), 2);
        assert_eq!(trimmed.unlabelled[0].seq_len(), 2);
        assert_eq!(trimmed.test[0].sequence.seq_len(), 2);
        assert_eq!(trimmed.test[0].label, 1);
    }
}
