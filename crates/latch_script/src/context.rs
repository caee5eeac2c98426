//! Per-call view handed to script hooks
//!
//! A context pairs the instance identity with the host table captured at
//! dispatch time. Scripts reach the engine only through it, which keeps
//! separately loaded script modules independent of bridge globals.

use latch_core::{EntityAddress, Vector3};

use crate::abi::NativeApi;
use crate::input::Input;
use crate::registry::{InstanceHandle, ScriptIdentity};

pub struct ScriptContext<'a> {
    identity: &'a ScriptIdentity,
    api: &'a NativeApi,
}

impl<'a> ScriptContext<'a> {
    pub fn new(identity: &'a ScriptIdentity, api: &'a NativeApi) -> Self {
        Self { identity, api }
    }

    pub fn handle(&self) -> InstanceHandle {
        self.identity.handle
    }

    pub fn owner(&self) -> EntityAddress {
        self.identity.owner
    }

    pub fn owner_index(&self) -> u32 {
        self.identity.owner.index()
    }

    pub fn owner_generation(&self) -> u32 {
        self.identity.owner.generation()
    }

    pub fn world_id(&self) -> u32 {
        self.identity.owner.world_id()
    }

    /// Keyboard, mouse, window and text input queries.
    pub fn input(&self) -> Input<'a> {
        Input::new(self.api)
    }

    pub fn log_info(&self, message: &str) {
        tracing::debug!(target: "latch_script", handle = %self.identity.handle, "{message}");
        self.api.log_info(message);
    }

    pub fn log_error(&self, message: &str) {
        tracing::debug!(target: "latch_script", handle = %self.identity.handle, error = true, "{message}");
        self.api.log_error(message);
    }

    /// World-space position of the owning entity.
    ///
    /// `None` when the host has no translation capability or does not know the
    /// entity.
    pub fn try_get_world_position(&self) -> Option<Vector3> {
        self.api.get_world_translation(self.identity.owner)
    }

    /// Move the owning entity. Returns `false` when the capability is missing or
    /// the host rejected the write.
    pub fn try_set_world_position(&self, position: Vector3) -> bool {
        self.api.set_world_translation(self.identity.owner, position)
    }
}
