//! TETHER Wire Format
//!
//! Little-endian, length-prefixed encodings for everything that crosses the
//! relay: registration and named-state RPCs, per-tick replication payloads,
//! and session-directory delta batches. Decoding never panics on truncated
//! or malformed input - it returns an error and the caller drops the packet.

pub mod codec;
pub mod rpc;

pub use codec::*;
pub use rpc::*;
