// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal per
// command (train, evaluate, generate data).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Re-evaluate a saved checkpoint
pub mod eval_use_case;

// Write a synthetic corpus to disk
pub mod generate_use_case;
