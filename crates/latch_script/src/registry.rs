//! Instance registry
//!
//! Maps opaque handles to live script instances. The registry is the only
//! long-lived owner of an instance; callers borrow a shared reference for the
//! duration of one dispatch.

use latch_core::EntityAddress;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::component::ScriptComponent;

/// Handle given to the host for a live script instance.
///
/// Handles come from a monotonic counter starting at 1 and are never reused,
/// so a stale handle can never alias a newer instance. `0` is invalid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    pub const INVALID: InstanceHandle = InstanceHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw value sent across the boundary.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who an instance is and which host entity it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScriptIdentity {
    pub handle: InstanceHandle,
    pub owner: EntityAddress,
}

/// A registered script instance.
pub struct ScriptInstance {
    identity: ScriptIdentity,
    type_name: String,
    component: Box<dyn ScriptComponent>,
}

impl ScriptInstance {
    pub fn identity(&self) -> &ScriptIdentity {
        &self.identity
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Split borrow for dispatch: identity by reference, component mutably.
    pub fn parts_mut(&mut self) -> (&ScriptIdentity, &mut dyn ScriptComponent) {
        (&self.identity, self.component.as_mut())
    }
}

/// Shared reference handed out for a single dispatch.
pub type SharedInstance = Arc<Mutex<ScriptInstance>>;

pub struct InstanceRegistry {
    next_handle: u64,
    instances: HashMap<InstanceHandle, SharedInstance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            instances: HashMap::new(),
        }
    }

    /// Register a freshly constructed component and stamp its identity.
    pub fn insert(
        &mut self,
        owner: EntityAddress,
        type_name: impl Into<String>,
        component: Box<dyn ScriptComponent>,
    ) -> InstanceHandle {
        let handle = InstanceHandle(self.next_handle);
        self.next_handle += 1;

        let instance = ScriptInstance {
            identity: ScriptIdentity { handle, owner },
            type_name: type_name.into(),
            component,
        };
        self.instances
            .insert(handle, Arc::new(Mutex::new(instance)));
        handle
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<SharedInstance> {
        self.instances.get(&handle).cloned()
    }

    /// Remove an instance. Returns `false` if the handle was not live.
    pub fn remove(&mut self, handle: InstanceHandle) -> bool {
        self.instances.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.instances.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
