//! Latch Script Bridge
//!
//! Native scripting bridge between the engine host and script components
//!
//! ## Architecture
//!
//! - **Boundary:** two `#[repr(C)]` function-pointer tables exchanged once by
//!   [`latch_script_startup`]; only opaque `u64` handles cross afterwards
//! - **Types:** resolved by name from the in-process registry or from script
//!   modules (dynamic libraries exporting [`export_script_module!`])
//! - **Dispatch:** every hook runs inside a failure boundary; errors and
//!   panics are logged to the host and never unwind into it
//!
//! Calls are expected from one thread at a time. The statics are locked so
//! they stay sound, but ordering between concurrent calls is the host's job.

pub mod abi;
pub mod boundary;
pub mod component;
pub mod context;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod input;
pub mod interop;
pub mod marshal;
pub mod module;
pub mod native;
pub mod registry;
pub mod resolver;
pub mod startup;
pub mod types;

pub use abi::{CreateInstanceArgs, ManagedApi, NativeApi};
pub use component::{Lifecycle, ScriptComponent};
pub use context::ScriptContext;
pub use error::{BridgeError, ScriptError, ScriptResult};
pub use host::{CreateRequest, ScriptHost};
pub use input::Input;
pub use interop::{latch_script_interop_check, InteropPayload};
pub use registry::InstanceHandle;
pub use startup::latch_script_startup;
pub use types::{register_script_type, ScriptType};

pub use latch_core::{EntityAddress, Vector3};
pub use latch_services::{Key, MouseButton};
