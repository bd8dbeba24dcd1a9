//! TETHER Test Harness
//!
//! A deterministic, in-memory stand-in for the relay: ordered per-peer
//! delivery, buffered-RPC replay for late joiners, sequential view-id
//! allocation, and longest-lived-peer authority election. `TestCluster`
//! wires several peers to one hub and pumps events and ticks in a fixed
//! order so multi-peer scenarios are reproducible.

pub mod cluster;
pub mod hub;

pub use cluster::*;
pub use hub::*;
