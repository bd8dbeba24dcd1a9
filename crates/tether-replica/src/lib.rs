//! TETHER Entity Replica
//!
//! Per-entity network state. Exactly one peer - the owner, fixed at spawn -
//! publishes an entity's transform each replication tick; every other peer
//! observes, converting the last received network transform into its own
//! local frame and smoothing toward it every tick so motion stays fluid
//! between publishes.

pub mod replica;

pub use replica::*;
