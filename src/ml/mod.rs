// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Network, adversarial regulariser, training loop and evaluation.
//
// What's in this layer:
//
//   gru.rs       — single-layer GRU encoder
//                  • update/reset gates, candidate state
//                  • dropout on every new hidden state
//
//   model.rs     — GRU encoder + linear head over the final state
//                  combined supervised + VAT training step
//
//   vat.rs       — virtual adversarial training
//                  • L2 scaling, KL with logits
//                  • power iteration for the adversarial direction
//
//   trainer.rs   — epoch loop, clipped Adam, periodic test eval,
//                  checkpoint + metrics per evaluation
//
//   evaluator.rs — accuracy / loss over a held-out loader
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Cho et al. (2014) GRU
//            Miyato et al. (2018) Virtual Adversarial Training

/// GRU recurrent encoder
pub mod gru;

/// Sequence classifier built on the GRU encoder
pub mod model;

/// Virtual adversarial loss
pub mod vat;

/// Full training loop with evaluation and checkpointing
pub mod trainer;

/// Held-out evaluation
pub mod evaluator;
