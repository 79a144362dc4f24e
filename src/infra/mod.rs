// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus the training
//                   and model configs as JSON so `eval` can
//                   rebuild the exact architecture.
//
//   metrics.rs    — Per-epoch loss/accuracy rows appended to
//                   a CSV file for later plotting.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
