//! TETHER Coordinate Frame
//!
//! Every peer has its own, unrelated physical coordinate frame. The
//! `CoordinateFrame` maps between that local frame and the shared network
//! frame by expressing everything relative to one active anchor:
//! the last-detected marker pose on an AR peer, a fixed world origin on a
//! VR peer. Peers never share anchors - each resolves network coordinates
//! independently, and two peers converge once both hold a valid anchor.

pub mod frame;

pub use frame::*;
