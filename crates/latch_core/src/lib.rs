//! Latch Engine Core
//!
//! Shared primitives that cross the scripting boundary:
//! - Packed math types with a fixed memory layout
//! - Entity addressing (world + generational owner index)

pub mod address;
pub mod math;

pub use glam;

pub use address::EntityAddress;
pub use math::Vector3;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
