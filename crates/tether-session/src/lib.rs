//! TETHER Session Seam
//!
//! The relay transport (connect, create/join/leave, RPC delivery, authority
//! election, buffered replay) is an external collaborator. This crate pins
//! down the interface the core components program against, plus the session
//! configuration that travels with session creation. The real transport and
//! the in-memory test hub both implement [`Relay`].

pub mod options;
pub mod relay;

pub use options::*;
pub use relay::*;

pub use tether_wire::{Rpc, RpcTarget};
