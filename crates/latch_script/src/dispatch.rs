//! `extern "C"` lifecycle entry points handed to the host
//!
//! Each entry point works on the process-wide [`ScriptHost`], contains every
//! failure and reports it through the host log. The host lock is released
//! before a hook runs and before any log line reaches the host, so hooks and
//! host log sinks may call back into the bridge.

use latch_services::ScriptSettings;
use once_cell::sync::Lazy;
use std::sync::{Mutex, PoisonError};

use crate::abi::{CreateInstanceArgs, ManagedApi};
use crate::boundary::{contain, contain_result};
use crate::component::Lifecycle;
use crate::error::BridgeError;
use crate::host::{invoke, CreateRequest, ScriptHost};
use crate::marshal::native_utf8_to_string;
use crate::native;
use crate::registry::InstanceHandle;

static HOST: Lazy<Mutex<ScriptHost>> =
    Lazy::new(|| Mutex::new(ScriptHost::with_settings(&ScriptSettings::default())));

/// Run `f` with the process-wide host locked.
///
/// Log lines written inside `f` (resolver diagnostics, factories) are
/// delivered to the host after the lock is released.
pub fn with_host<R>(f: impl FnOnce(&mut ScriptHost) -> R) -> R {
    native::deferred(|| {
        let mut host = HOST.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut host)
    })
}

/// The bridge's outbound table.
pub(crate) fn managed_api() -> ManagedApi {
    ManagedApi {
        create_instance,
        destroy_instance,
        on_create,
        on_destroy,
        on_enable,
        on_disable,
        tick,
    }
}

unsafe extern "C" fn create_instance(args: *const CreateInstanceArgs) -> u64 {
    let created = contain_result(|| {
        let args = unsafe { args.as_ref() }.ok_or(BridgeError::MissingArgs)?;
        let type_name = unsafe { native_utf8_to_string(args.type_name_utf8) };
        let module_path = unsafe { native_utf8_to_string(args.module_path_utf8) };

        let request = CreateRequest {
            type_name: type_name.as_deref(),
            module_path: module_path.as_deref(),
            owner: args.owner(),
        };
        with_host(|host| host.create_instance(&request))
    });

    match created {
        Ok(handle) => handle.raw(),
        Err(failure) => {
            native::log_error(&format!("CreateInstance failed: {failure}"));
            InstanceHandle::INVALID.raw()
        }
    }
}

extern "C" fn destroy_instance(handle: u64) {
    let handle = InstanceHandle::from_raw(handle);
    if let Err(failure) = contain(|| with_host(|host| host.destroy_instance(handle))) {
        native::log_error(&format!("Script exception: {failure}"));
    }
}

extern "C" fn on_create(handle: u64) {
    dispatch(handle, Lifecycle::Create);
}

extern "C" fn on_destroy(handle: u64) {
    dispatch(handle, Lifecycle::Destroy);
}

extern "C" fn on_enable(handle: u64) {
    dispatch(handle, Lifecycle::Enable);
}

extern "C" fn on_disable(handle: u64) {
    dispatch(handle, Lifecycle::Disable);
}

extern "C" fn tick(handle: u64, dt: f32) {
    dispatch(handle, Lifecycle::Tick(dt));
}

fn dispatch(handle: u64, call: Lifecycle) {
    let handle = InstanceHandle::from_raw(handle);
    let instance = match contain(|| with_host(|host| host.instance(handle))) {
        Ok(Some(instance)) => instance,
        Ok(None) => return,
        Err(failure) => {
            native::log_error(&format!("Script exception: {failure}"));
            return;
        }
    };

    invoke(&instance, call, &native::current());
}
