//! TETHER Runtime - the per-peer reactor
//!
//! One `Peer` per participant. All component operations - anchor updates,
//! spawn decisions, replication reads and writes, directory merges - execute
//! as reactions to discrete events delivered in a defined per-peer order, so
//! there is no locking and no intra-peer parallelism. Cross-peer races are
//! resolved structurally: only the authority spawns, only the owner
//! publishes.

pub mod driver;
pub mod peer;
pub mod telemetry;

pub use driver::*;
pub use peer::*;
pub use telemetry::*;
