//! Bridge entry point
//!
//! The host calls [`latch_script_startup`] once with its capability table and
//! receives the bridge's lifecycle table in return.

use latch_services::ScriptSettings;
use std::mem::size_of;
use std::ptr;
use std::sync::OnceLock;

use crate::abi::{ManagedApi, NativeApi};
use crate::boundary::contain;
use crate::dispatch::{managed_api, with_host};
use crate::native;
use crate::resolver::{discover_base_dir, executable_dir};

// Lives for the rest of the process; the host keeps the pointer.
static MANAGED_API: OnceLock<ManagedApi> = OnceLock::new();

/// Capture the host table and hand back the bridge's lifecycle table.
///
/// Returns null when `native_api` is null or `native_api_size` is smaller than
/// this bridge's `NativeApi`; nothing is captured in that case. Calling again
/// replaces the captured table and returns the same pointer.
///
/// # Safety
/// `native_api` must be null or point to at least `native_api_size` readable
/// bytes laid out as a `NativeApi`.
#[no_mangle]
pub unsafe extern "C" fn latch_script_startup(
    native_api: *const NativeApi,
    native_api_size: i32,
) -> *const ManagedApi {
    match contain(|| unsafe { startup(native_api, native_api_size) }) {
        Ok(managed) => managed,
        Err(failure) => {
            tracing::error!(target: "latch_script", "Startup failed: {failure}");
            ptr::null()
        }
    }
}

unsafe fn startup(native_api: *const NativeApi, native_api_size: i32) -> *const ManagedApi {
    let declared = usize::try_from(native_api_size).unwrap_or(0);
    if native_api.is_null() || declared < size_of::<NativeApi>() {
        tracing::warn!(
            target: "latch_script",
            declared = native_api_size,
            expected = size_of::<NativeApi>(),
            "Rejected native API table"
        );
        return ptr::null();
    }

    native::install(unsafe { *native_api });
    native::log_info("Script runtime startup initialized.");

    let settings = load_settings();
    let base_dir = discover_base_dir(&settings);
    with_host(|host| host.configure(&settings));
    tracing::info!(target: "latch_script", base_dir = %base_dir.display(), "Script resolver configured");

    MANAGED_API.get_or_init(managed_api) as *const ManagedApi
}

/// Settings for this process; a broken settings file falls back to defaults.
fn load_settings() -> ScriptSettings {
    match ScriptSettings::discover(executable_dir().as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            native::log_error(&format!("Script settings ignored: {err}"));
            ScriptSettings::default()
        }
    }
}
