//! Boundary math types
//!
//! Re-exports glam for engine-side math and adds the packed vector that
//! crosses the scripting ABI verbatim.

pub use glam::*;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Three packed 32-bit floats (X, Y, Z).
///
/// Layout is `#[repr(C)]` with no padding (enforced by `Pod`), so a pointer to
/// this type can be handed to native code expecting `float[3]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

const _: () = assert!(std::mem::size_of::<Vector3>() == 12);
const _: () = assert!(std::mem::align_of::<Vector3>() == 4);

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}
