// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing the data the
// classifier is trained on.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Time-major input sequences and their labels
pub mod sequence;

// Labelled / unlabelled / test pools and their validation
pub mod corpus;

// Core abstractions (traits) that other layers implement
pub mod traits;
