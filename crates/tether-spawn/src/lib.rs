//! TETHER Spawn Registry
//!
//! Several peers can observe the same trigger - the same physical marker,
//! at slightly different times - yet the cluster must create exactly one
//! shared entity per key. Only the authority peer ever calls create; the
//! binding itself is established cluster-wide by a buffered registration
//! broadcast, which is the single source of truth for "does this key have
//! an entity".

pub mod registry;

pub use registry::*;
