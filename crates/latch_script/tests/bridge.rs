// Integration tests driving the bridge through its extern "C" tables

mod common;

use common::{create, errors, infos, serial, start, startup_with, stub_native_api, take_log};
use latch_script::registry::{InstanceHandle, ScriptIdentity};
use latch_script::types::{register_script_type, ScriptType};
use latch_script::{
    script_type, EntityAddress, ManagedApi, NativeApi, ScriptComponent, ScriptContext,
    ScriptError, ScriptResult, Vector3,
};
use std::ffi::{c_char, CStr};
use std::mem::size_of;
use std::sync::atomic::{AtomicPtr, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

fn full_size() -> i32 {
    size_of::<NativeApi>() as i32
}

#[derive(Default)]
struct Counter;

impl ScriptComponent for Counter {
    fn tick(&mut self, ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
        ctx.log_info(&format!("counter tick {}", ctx.handle()));
        Ok(())
    }
}

#[derive(Default)]
struct Exploding;

impl ScriptComponent for Exploding {
    fn on_enable(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        Err(ScriptError::invalid_state("enable refused"))
    }

    fn tick(&mut self, _ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
        panic!("tick exploded")
    }
}

#[derive(Default)]
struct Mover;

impl ScriptComponent for Mover {
    fn tick(&mut self, ctx: &ScriptContext<'_>, dt: f32) -> ScriptResult {
        let current = ctx.try_get_world_position().unwrap_or_default();
        let next = Vector3::new(current.x + dt, current.y, current.z);
        if !ctx.try_set_world_position(next) {
            return Err(ScriptError::not_found("no translation capability"));
        }
        Ok(())
    }
}

static MANAGED: AtomicPtr<ManagedApi> = AtomicPtr::new(std::ptr::null_mut());

#[derive(Default)]
struct SelfDestruct;

impl ScriptComponent for SelfDestruct {
    fn tick(&mut self, ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
        let managed = unsafe { &*MANAGED.load(Ordering::SeqCst) };
        unsafe { (managed.destroy_instance)(ctx.handle().raw()) };
        ctx.log_info("self destructed");
        Ok(())
    }
}

static REJECTED_LOGS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn rejected_log(_message: *const c_char) {
    REJECTED_LOGS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_startup_rejects_null_and_short_tables() {
    let _guard = serial();
    let managed = start();

    assert!(startup_with(std::ptr::null(), full_size()).is_null());

    let other = NativeApi {
        log_info: Some(rejected_log),
        log_error: Some(rejected_log),
        ..Default::default()
    };
    assert!(startup_with(&other, full_size() - 1).is_null());
    assert!(startup_with(&other, 0).is_null());
    assert!(startup_with(&other, -1).is_null());

    // The stub table captured by `start` is still the active one.
    assert_eq!(create(managed, Some("bridge::Missing"), None, (0, 0, 0)), 0);
    assert_eq!(REJECTED_LOGS.load(Ordering::SeqCst), 0);
    let log = take_log();
    assert_eq!(errors(&log).len(), 1);
}

#[test]
fn test_startup_pointer_is_stable() {
    let _guard = serial();
    let api = stub_native_api();
    let first = startup_with(&api, full_size());
    let second = startup_with(&api, full_size() + 64);
    assert!(!first.is_null());
    assert_eq!(first, second);

    let log = take_log();
    assert_eq!(
        infos(&log),
        vec![
            "Script runtime startup initialized.",
            "Script runtime startup initialized."
        ]
    );
    assert!(errors(&log).is_empty());
}

#[test]
fn test_handles_are_unique_and_never_reused() {
    let _guard = serial();
    let managed = start();

    let mut seen = Vec::new();
    for i in 0..20 {
        let handle = create(managed, Some("DemoScript"), None, (i, 1, 0));
        assert_ne!(handle, 0);
        assert!(!seen.contains(&handle));
        seen.push(handle);
        if i % 2 == 0 {
            unsafe { (managed.destroy_instance)(handle) };
        }
    }
    for handle in seen {
        unsafe { (managed.destroy_instance)(handle) };
    }
    assert!(errors(&take_log()).is_empty());
}

#[test]
fn test_stale_handle_calls_are_silent() {
    let _guard = serial();
    let managed = start();

    let handle = create(managed, Some("DemoScript"), None, (1, 1, 1));
    assert_ne!(handle, 0);
    unsafe {
        (managed.destroy_instance)(handle);
        (managed.destroy_instance)(handle);
        (managed.on_create)(handle);
        (managed.on_enable)(handle);
        (managed.tick)(handle, 0.016);
        (managed.tick)(handle, 5.0);
        (managed.on_disable)(handle);
        (managed.on_destroy)(handle);
        (managed.tick)(0, 1.0);
        (managed.tick)(u64::MAX, 1.0);
    }
    assert!(take_log().is_empty());
}

#[test]
fn test_non_component_type_logs_one_error() {
    let _guard = serial();
    let managed = start();
    register_script_type(ScriptType::plain("bridge::PlainData"));

    assert_eq!(create(managed, Some("bridge::PlainData"), None, (0, 0, 0)), 0);

    let log = take_log();
    assert_eq!(
        errors(&log),
        vec!["CreateInstance failed: InvalidCast: type 'bridge::PlainData' is not a ScriptComponent"]
    );
    assert!(infos(&log).is_empty());
}

#[test]
fn test_missing_type_name_and_args() {
    let _guard = serial();
    let managed = start();

    assert_eq!(create(managed, None, None, (0, 0, 0)), 0);
    assert_eq!(create(managed, Some(""), None, (0, 0, 0)), 0);
    assert_eq!(unsafe { (managed.create_instance)(std::ptr::null()) }, 0);

    let log = take_log();
    assert_eq!(
        errors(&log),
        vec![
            "CreateInstance failed: InvalidArgument: missing type name",
            "CreateInstance failed: InvalidArgument: missing type name",
            "CreateInstance failed: InvalidArgument: missing create arguments",
        ]
    );
}

#[test]
fn test_unresolvable_module_path_fails_creation() {
    let _guard = serial();
    let managed = start();

    let handle = create(
        managed,
        Some("bridge::Ghost"),
        Some("/definitely/not/here/ghost_scripts.so"),
        (0, 0, 0),
    );
    assert_eq!(handle, 0);

    let log = take_log();
    let errors = errors(&log);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("ResolveType failed: ModuleLoad: "));
    assert_eq!(
        errors[1],
        "CreateInstance failed: TypeNotFound: type 'bridge::Ghost' not found"
    );
}

#[test]
fn test_failing_hooks_do_not_stop_other_instances() {
    let _guard = serial();
    let managed = start();
    register_script_type(script_type!(Counter, "bridge::Counter"));
    register_script_type(script_type!(Exploding, "bridge::Exploding"));

    let bad = create(managed, Some("bridge::Exploding"), None, (1, 0, 0));
    let good = create(managed, Some("bridge::Counter"), None, (2, 0, 0));
    assert!(bad != 0 && good != 0);

    unsafe {
        (managed.tick)(bad, 0.016);
        (managed.tick)(good, 0.016);
    }
    let log = take_log();
    assert_eq!(errors(&log), vec!["Script exception: panic: tick exploded"]);
    assert_eq!(infos(&log), vec![format!("counter tick {good}")]);

    // Still registered and still dispatchable.
    unsafe { (managed.on_enable)(bad) };
    let log = take_log();
    assert_eq!(
        errors(&log),
        vec!["Script exception: InvalidState: enable refused"]
    );

    unsafe {
        (managed.destroy_instance)(bad);
        (managed.destroy_instance)(good);
    }
}

#[test]
fn test_world_position_round_trip_through_host() {
    let _guard = serial();
    let api = stub_native_api();
    let owner = EntityAddress::new(9, 4, 2);
    let identity = ScriptIdentity {
        handle: InstanceHandle::from_raw(77),
        owner,
    };
    let ctx = ScriptContext::new(&identity, &api);

    let written = Vector3::new(1.5, -2.25, 1e6);
    assert!(ctx.try_set_world_position(written));
    assert_eq!(ctx.try_get_world_position(), Some(written));
    assert_eq!(common::stored_translation(9, 4, 2), Some(written));
}

#[test]
fn test_world_position_through_dispatch() {
    let _guard = serial();
    let managed = start();
    register_script_type(script_type!(Mover, "bridge::Mover"));

    let handle = create(managed, Some("bridge::Mover"), None, (5, 6, 3));
    unsafe {
        (managed.tick)(handle, 0.5);
        (managed.tick)(handle, 0.25);
        (managed.destroy_instance)(handle);
    }
    assert!(take_log().is_empty());
    let stored = common::stored_translation(3, 5, 6).unwrap();
    assert_eq!(stored, Vector3::new(0.75, 0.0, 0.0));
}

#[test]
fn test_absent_world_capability_returns_false() {
    let api = NativeApi::default();
    let identity = ScriptIdentity {
        handle: InstanceHandle::from_raw(1),
        owner: EntityAddress::new(1, 1, 1),
    };
    let ctx = ScriptContext::new(&identity, &api);
    assert_eq!(ctx.try_get_world_position(), None);
    assert!(!ctx.try_set_world_position(Vector3::new(1.0, 2.0, 3.0)));
    assert!(!ctx.input().has_focus());
}

#[test]
fn test_hook_can_destroy_its_own_instance() {
    let _guard = serial();
    let managed = start();
    MANAGED.store(managed as *const ManagedApi as *mut ManagedApi, Ordering::SeqCst);
    register_script_type(script_type!(SelfDestruct, "bridge::SelfDestruct"));

    let handle = create(managed, Some("bridge::SelfDestruct"), None, (0, 0, 0));
    unsafe { (managed.tick)(handle, 0.016) };
    assert_eq!(infos(&take_log()), vec!["self destructed"]);

    unsafe { (managed.tick)(handle, 0.016) };
    assert!(take_log().is_empty());
}

static SINK_CREATED: AtomicU64 = AtomicU64::new(0);
static SINK_ERRORS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Error sink that creates an instance when it sees a resolver failure.
unsafe extern "C" fn creating_log_error(message: *const c_char) {
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
    if text.starts_with("ResolveType failed") {
        let managed = unsafe { &*MANAGED.load(Ordering::SeqCst) };
        SINK_CREATED.store(create(managed, Some("DemoScript"), None, (8, 8, 8)), Ordering::SeqCst);
    }
    SINK_ERRORS.lock().unwrap().push(text);
}

#[test]
fn test_log_sink_can_call_back_into_bridge() {
    let _guard = serial();
    let managed = start();
    MANAGED.store(managed as *const ManagedApi as *mut ManagedApi, Ordering::SeqCst);

    let api = NativeApi {
        log_error: Some(creating_log_error),
        ..stub_native_api()
    };
    assert_eq!(startup_with(&api, full_size()), managed as *const ManagedApi);

    let handle = create(
        managed,
        Some("bridge::Phantom"),
        Some("/definitely/not/here/phantom_scripts.so"),
        (0, 0, 0),
    );
    assert_eq!(handle, 0);

    let created = SINK_CREATED.load(Ordering::SeqCst);
    assert_ne!(created, 0);
    let sink_errors = std::mem::take(&mut *SINK_ERRORS.lock().unwrap());
    assert_eq!(sink_errors.len(), 2);
    assert!(sink_errors[0].starts_with("ResolveType failed: ModuleLoad: "));
    assert_eq!(
        sink_errors[1],
        "CreateInstance failed: TypeNotFound: type 'bridge::Phantom' not found"
    );

    unsafe { (managed.destroy_instance)(created) };
    start();
}

