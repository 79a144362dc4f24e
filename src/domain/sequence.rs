// ============================================================
// Layer 3 — Sequence Domain Types
// ============================================================
// A Sequence is one input to the classifier: `seq_len` time
// steps, each a vector of `input_dim` features.
//
// Storage is time-major:
//   steps[t][f] = feature f at time step t
//
// When flattened for tensor construction we walk the steps in
// order, so the flat layout is [t0_f0, t0_f1, ..., tT_fF],
// which reshapes directly to [seq_len, input_dim].
//
// Reference: Rust Book §5 (Structs and Methods)

/// One input sequence, time-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub steps: Vec<Vec<f32>>,
}

impl Sequence {
    pub fn new(steps: Vec<Vec<f32>>) -> Self {
        Self { steps }
    }

    /// Number of time steps
    pub fn seq_len(&self) -> usize {
        self.steps.len()
    }

    /// Feature width of the first step (0 for an empty sequence)
    pub fn input_dim(&self) -> usize {
        self.steps.first().map(|s| s.len()).unwrap_or(0)
    }

    /// True when every step has the same width
    pub fn is_rectangular(&self) -> bool {
        let width = self.input_dim();
        self.steps.iter().all(|s| s.len() == width)
    }

    /// Row-major copy of all features: [seq_len * input_dim]
    pub fn flatten(&self) -> Vec<f32> {
        self.steps.iter().flat_map(|s| s.iter().copied()).collect()
    }

    /// Drop the first and last time step.
    ///
    /// Sequences with two steps or fewer become empty, which
    /// `Corpus::validate` rejects later.
    pub fn trim_edges(&self) -> Sequence {
        if self.steps.len() <= 2 {
            return Sequence::new(Vec::new());
        }
        Sequence::new(self.steps[1..self.steps.len() - 1].to_vec())
    }
}

/// A sequence paired with its class index.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledSequence {
    pub sequence: Sequence,
    pub label:    usize,
}

impl LabelledSequence {
    pub fn new(sequence: Sequence, label: usize) -> Self {
        Self { sequence, label }
    }
}
