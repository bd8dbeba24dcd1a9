//! TETHER Session Directory
//!
//! The transport never sends a full snapshot of open sessions - only deltas
//! since the last batch. The reconciler merges those partial batches into
//! one authoritative listing; replacing the listing wholesale on every batch
//! would silently drop every session the latest batch did not mention.

pub mod reconcile;

pub use reconcile::*;
