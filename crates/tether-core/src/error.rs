//! Error types for TETHER

use thiserror::Error;

use crate::{EntityKey, ViewId};

/// Core TETHER errors
#[derive(Error, Debug)]
pub enum TetherError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown RPC tag: {0}")]
    UnknownRpcTag(u8),

    // Entity errors
    #[error("View not found: {0:?}")]
    ViewNotFound(ViewId),

    #[error("Entity not registered: {0:?}")]
    EntityNotRegistered(EntityKey),

    // Transport errors
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Not connected to a session")]
    NotInSession,
}

/// Result type for TETHER operations
pub type TetherResult<T> = Result<T, TetherError>;
