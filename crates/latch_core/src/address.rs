//! Entity addressing for engine-world queries
//!
//! Scripts never see the host's entity storage. They only carry the triple the
//! host handed over at creation time and pass it back on every world query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque address of an entity inside a host world.
///
/// Format: [32-bit world | 32-bit index | 32-bit generation]
/// - World: Which host world owns the entity
/// - Index: Slot in the host's entity table
/// - Generation: Bumped by the host when the slot is reused
///
/// The bridge forwards these values untouched; validation is the host's job.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityAddress {
    world_id: u32,
    index: u32,
    generation: u32,
}

impl EntityAddress {
    pub const fn new(world_id: u32, index: u32, generation: u32) -> Self {
        Self {
            world_id,
            index,
            generation,
        }
    }

    pub fn world_id(&self) -> u32 {
        self.world_id
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack index and generation into 64 bits (world id is not included)
    pub fn owner_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Rebuild an address from a world id and packed owner bits
    pub fn from_owner_bits(world_id: u32, bits: u64) -> Self {
        Self {
            world_id,
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "owner=({},{}) world={}",
            self.index, self.generation, self.world_id
        )
    }
}
