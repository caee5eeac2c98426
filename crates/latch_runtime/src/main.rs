//! Latch Script Host
//!
//! Stub engine that boots the script bridge and drives a few seconds of frames
//!
//! Usage: `latch [TYPE_NAME [MODULE_PATH]]`
//!
//! Without arguments only the built-in `DemoScript` runs. With a type name
//! (for example `"demo::Spinner, latch_script_demo"`) that script is attached
//! to a second entity as well.

mod native_host;

use anyhow::{bail, ensure, Context, Result};
use latch_core::{EntityAddress, Vector3};
use latch_script::interop::{latch_script_interop_check, InteropPayload, CHECK_OK};
use latch_script::{latch_script_startup, CreateInstanceArgs, ManagedApi, NativeApi};
use latch_services::{Key, MouseButton};
use std::ffi::CString;
use std::mem::size_of;
use std::ptr;
use tracing_subscriber::EnvFilter;

const FRAMES: u32 = 180;
const DT: f32 = 1.0 / 60.0;
const WORLD: u32 = 7;

unsafe extern "C" fn interop_add(a: i32, b: i32) -> i32 {
    a + b
}

fn check_calling_convention() -> Result<()> {
    let mut payload = InteropPayload {
        callback: Some(interop_add),
        a: 2,
        b: 3,
        ..Default::default()
    };
    let status =
        unsafe { latch_script_interop_check(&mut payload, size_of::<InteropPayload>() as i32) };
    ensure!(
        status == CHECK_OK && payload.result == 5 && payload.callback_hit == 1,
        "interop check failed with status {status}"
    );
    Ok(())
}

fn startup() -> Result<&'static ManagedApi> {
    let api = native_host::native_api();
    let managed = unsafe { latch_script_startup(&api, size_of::<NativeApi>() as i32) };
    if managed.is_null() {
        bail!("script bridge rejected the native API table");
    }
    Ok(unsafe { &*managed })
}

fn create(
    managed: &ManagedApi,
    type_name: &str,
    module_path: Option<&str>,
    owner: EntityAddress,
) -> Result<u64> {
    let type_name = CString::new(type_name).context("type name contains NUL")?;
    let module_path = module_path
        .map(CString::new)
        .transpose()
        .context("module path contains NUL")?;

    let args = CreateInstanceArgs {
        module_path_utf8: module_path.as_ref().map_or(ptr::null(), |p| p.as_ptr()),
        type_name_utf8: type_name.as_ptr(),
        owner_index: owner.index(),
        owner_generation: owner.generation(),
        world_id: owner.world_id(),
    };
    let handle = unsafe { (managed.create_instance)(&args) };
    if handle == 0 {
        bail!("failed to create script {:?}", type_name);
    }
    Ok(handle)
}

fn simulate_input(frame: u32) {
    native_host::begin_frame(|input| {
        let t = frame as f32 * DT;
        let x = 640.0 + 200.0 * t.cos();
        let y = 360.0 + 120.0 * t.sin();
        input.move_mouse_to(x as i32, y as i32);

        match frame {
            30 => input.press(Key::Space),
            60 => input.chars.extend("hello".chars()),
            61 => input.press(Key::Enter),
            90 => input.press(Key::R),
            120 => input.click(MouseButton::Left),
            _ => {}
        }
    });
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Latch Script Host v{}", latch_core::VERSION);

    let mut args = std::env::args().skip(1);
    let extra_type = args.next();
    let extra_module = args.next();

    check_calling_convention()?;
    let managed = startup()?;

    let mut handles = Vec::new();
    let demo_owner = EntityAddress::new(WORLD, 3, 1);
    handles.push(create(managed, "DemoScript", None, demo_owner)?);

    let extra_owner = EntityAddress::new(WORLD, 4, 1);
    if let Some(type_name) = extra_type.as_deref() {
        native_host::spawn(extra_owner, Vector3::new(0.0, 1.0, 0.0));
        handles.push(create(managed, type_name, extra_module.as_deref(), extra_owner)?);
    }

    for &handle in &handles {
        unsafe {
            (managed.on_create)(handle);
            (managed.on_enable)(handle);
        }
    }

    for frame in 0..FRAMES {
        simulate_input(frame);
        for &handle in &handles {
            unsafe { (managed.tick)(handle, DT) };
        }
    }

    if let Some(position) = native_host::translation(extra_owner) {
        tracing::info!("Scripted entity ended at {:?}", position.to_array());
    }

    for handle in handles {
        unsafe {
            (managed.on_disable)(handle);
            (managed.on_destroy)(handle);
            (managed.destroy_instance)(handle);
            // Late calls after teardown are ignored by the bridge.
            (managed.tick)(handle, DT);
        }
    }

    tracing::info!("Script host shut down cleanly");
    Ok(())
}
