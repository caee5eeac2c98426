// Stub native host shared by the bridge integration tests

#![allow(dead_code)]

use latch_script::{latch_script_startup, CreateInstanceArgs, ManagedApi, NativeApi, Vector3};
use std::ffi::{c_char, CStr, CString};
use std::mem::size_of;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    Info(String),
    Error(String),
}

static SERIAL: Mutex<()> = Mutex::new(());
static LOG: Mutex<Vec<LogLine>> = Mutex::new(Vec::new());
static TRANSLATIONS: Mutex<Vec<((u32, u32, u32), Vector3)>> = Mutex::new(Vec::new());
static SPACE_PRESSED: AtomicBool = AtomicBool::new(false);

pub const MOUSE_X: i32 = 120;
pub const MOUSE_Y: i32 = 45;

/// Serialise tests that touch process-wide bridge state.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn take_log() -> Vec<LogLine> {
    std::mem::take(&mut *LOG.lock().unwrap())
}

pub fn errors(lines: &[LogLine]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| match line {
            LogLine::Error(text) => Some(text.as_str()),
            LogLine::Info(_) => None,
        })
        .collect()
}

pub fn infos(lines: &[LogLine]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| match line {
            LogLine::Info(text) => Some(text.as_str()),
            LogLine::Error(_) => None,
        })
        .collect()
}

pub fn set_space_pressed(pressed: bool) {
    SPACE_PRESSED.store(pressed, Ordering::SeqCst);
}

pub fn stored_translation(world: u32, index: u32, generation: u32) -> Option<Vector3> {
    TRANSLATIONS
        .lock()
        .unwrap()
        .iter()
        .find(|(key, _)| *key == (world, index, generation))
        .map(|(_, value)| *value)
}

unsafe fn text(message: *const c_char) -> String {
    unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned()
}

unsafe extern "C" fn log_info(message: *const c_char) {
    LOG.lock().unwrap().push(LogLine::Info(unsafe { text(message) }));
}

unsafe extern "C" fn log_error(message: *const c_char) {
    LOG.lock().unwrap().push(LogLine::Error(unsafe { text(message) }));
}

unsafe extern "C" fn was_key_pressed(key: u16) -> bool {
    key == latch_script::Key::Space.code() && SPACE_PRESSED.load(Ordering::SeqCst)
}

unsafe extern "C" fn mouse_x() -> i32 {
    MOUSE_X
}

unsafe extern "C" fn mouse_y() -> i32 {
    MOUSE_Y
}

unsafe extern "C" fn get_translation(
    world: u32,
    index: u32,
    generation: u32,
    value: *mut Vector3,
) -> bool {
    match stored_translation(world, index, generation) {
        Some(stored) => {
            unsafe { *value = stored };
            true
        }
        None => false,
    }
}

unsafe extern "C" fn set_translation(
    world: u32,
    index: u32,
    generation: u32,
    value: *mut Vector3,
) -> bool {
    let value = unsafe { *value };
    let mut store = TRANSLATIONS.lock().unwrap();
    store.retain(|(key, _)| *key != (world, index, generation));
    store.push(((world, index, generation), value));
    true
}

/// Table with logging, input and world translation wired to the stubs above.
pub fn stub_native_api() -> NativeApi {
    NativeApi {
        log_info: Some(log_info),
        log_error: Some(log_error),
        was_key_pressed: Some(was_key_pressed),
        get_mouse_x: Some(mouse_x),
        get_mouse_y: Some(mouse_y),
        get_world_translation: Some(get_translation),
        set_world_translation: Some(set_translation),
        ..Default::default()
    }
}

pub fn startup_with(api: *const NativeApi, size: i32) -> *const ManagedApi {
    unsafe { latch_script_startup(api, size) }
}

/// Start the bridge with the stub table and drop the startup log line.
pub fn start() -> &'static ManagedApi {
    let api = stub_native_api();
    let managed = startup_with(&api, size_of::<NativeApi>() as i32);
    assert!(!managed.is_null());
    take_log();
    unsafe { &*managed }
}

pub fn create(
    managed: &ManagedApi,
    type_name: Option<&str>,
    module_path: Option<&str>,
    owner: (u32, u32, u32),
) -> u64 {
    let type_name = type_name.map(|s| CString::new(s).unwrap());
    let module_path = module_path.map(|s| CString::new(s).unwrap());
    let args = CreateInstanceArgs {
        module_path_utf8: module_path.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
        type_name_utf8: type_name.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
        owner_index: owner.0,
        owner_generation: owner.1,
        world_id: owner.2,
    };
    unsafe { (managed.create_instance)(&args) }
}
