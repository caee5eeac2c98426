//! Capability tables exchanged with the host
//!
//! Both tables are `#[repr(C)]` sequences of function pointers whose order is
//! the contract. Never reorder fields; append only, and only together with the
//! host, since the host's declared size is the sole version check.

use latch_core::{EntityAddress, Vector3};
use latch_services::Key;
use std::ffi::c_char;

use crate::marshal::with_native_utf8;

pub type LogFn = unsafe extern "C" fn(message: *const c_char);
pub type KeyQueryFn = unsafe extern "C" fn(key: u16) -> bool;
pub type MouseButtonQueryFn = unsafe extern "C" fn(button: u32) -> bool;
pub type I32QueryFn = unsafe extern "C" fn() -> i32;
pub type U32QueryFn = unsafe extern "C" fn() -> u32;
pub type F32QueryFn = unsafe extern "C" fn() -> f32;
pub type BoolQueryFn = unsafe extern "C" fn() -> bool;
pub type CharInputAtFn = unsafe extern "C" fn(index: u32) -> u32;
pub type WorldTranslationFn = unsafe extern "C" fn(
    world_id: u32,
    owner_index: u32,
    owner_generation: u32,
    value: *mut Vector3,
) -> bool;

/// Host services available to scripts (host -> bridge).
///
/// Every slot may be null; a null slot means the capability is absent and the
/// safe wrappers below return a neutral default instead of calling it.
#[derive(Clone, Copy, Default)]
#[repr(C)]
pub struct NativeApi {
    pub log_info: Option<LogFn>,
    pub log_error: Option<LogFn>,

    pub is_key_down: Option<KeyQueryFn>,
    pub was_key_pressed: Option<KeyQueryFn>,
    pub was_key_released: Option<KeyQueryFn>,

    pub is_mouse_button_down: Option<MouseButtonQueryFn>,
    pub was_mouse_button_pressed: Option<MouseButtonQueryFn>,
    pub was_mouse_button_released: Option<MouseButtonQueryFn>,

    pub get_mouse_x: Option<I32QueryFn>,
    pub get_mouse_y: Option<I32QueryFn>,
    pub get_mouse_delta_x: Option<I32QueryFn>,
    pub get_mouse_delta_y: Option<I32QueryFn>,
    pub get_mouse_wheel_delta: Option<F32QueryFn>,

    pub get_window_width: Option<U32QueryFn>,
    pub get_window_height: Option<U32QueryFn>,
    pub has_focus: Option<BoolQueryFn>,

    pub get_char_input_count: Option<U32QueryFn>,
    pub get_char_input_at: Option<CharInputAtFn>,

    pub get_world_translation: Option<WorldTranslationFn>,
    pub set_world_translation: Option<WorldTranslationFn>,
}

pub type CreateInstanceFn = unsafe extern "C" fn(args: *const CreateInstanceArgs) -> u64;
pub type HandleFn = unsafe extern "C" fn(handle: u64);
pub type TickFn = unsafe extern "C" fn(handle: u64, dt: f32);

/// Instance lifecycle entry points (bridge -> host).
#[derive(Clone, Copy)]
#[repr(C)]
pub struct ManagedApi {
    pub create_instance: CreateInstanceFn,
    pub destroy_instance: HandleFn,
    pub on_create: HandleFn,
    pub on_destroy: HandleFn,
    pub on_enable: HandleFn,
    pub on_disable: HandleFn,
    pub tick: TickFn,
}

/// Arguments for `ManagedApi::create_instance`.
///
/// Both strings are NUL-terminated UTF-8 owned by the caller for the duration
/// of the call. `module_path_utf8` may be null.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct CreateInstanceArgs {
    pub module_path_utf8: *const c_char,
    pub type_name_utf8: *const c_char,
    pub owner_index: u32,
    pub owner_generation: u32,
    pub world_id: u32,
}

impl CreateInstanceArgs {
    pub fn owner(&self) -> EntityAddress {
        EntityAddress::new(self.world_id, self.owner_index, self.owner_generation)
    }
}

// Safe wrappers. Each one is a thin call through a slot, with a neutral
// default when the slot is null.
impl NativeApi {
    pub fn log_info(&self, message: &str) {
        if let Some(f) = self.log_info {
            with_native_utf8(message, |ptr| unsafe { f(ptr) });
        }
    }

    pub fn log_error(&self, message: &str) {
        if let Some(f) = self.log_error {
            with_native_utf8(message, |ptr| unsafe { f(ptr) });
        }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.is_key_down.map_or(false, |f| unsafe { f(key.code()) })
    }

    pub fn was_key_pressed(&self, key: Key) -> bool {
        self.was_key_pressed.map_or(false, |f| unsafe { f(key.code()) })
    }

    pub fn was_key_released(&self, key: Key) -> bool {
        self.was_key_released.map_or(false, |f| unsafe { f(key.code()) })
    }

    pub fn is_mouse_button_down(&self, button: u32) -> bool {
        self.is_mouse_button_down.map_or(false, |f| unsafe { f(button) })
    }

    pub fn was_mouse_button_pressed(&self, button: u32) -> bool {
        self.was_mouse_button_pressed
            .map_or(false, |f| unsafe { f(button) })
    }

    pub fn was_mouse_button_released(&self, button: u32) -> bool {
        self.was_mouse_button_released
            .map_or(false, |f| unsafe { f(button) })
    }

    pub fn mouse_x(&self) -> i32 {
        self.get_mouse_x.map_or(0, |f| unsafe { f() })
    }

    pub fn mouse_y(&self) -> i32 {
        self.get_mouse_y.map_or(0, |f| unsafe { f() })
    }

    pub fn mouse_delta_x(&self) -> i32 {
        self.get_mouse_delta_x.map_or(0, |f| unsafe { f() })
    }

    pub fn mouse_delta_y(&self) -> i32 {
        self.get_mouse_delta_y.map_or(0, |f| unsafe { f() })
    }

    pub fn mouse_wheel_delta(&self) -> f32 {
        self.get_mouse_wheel_delta.map_or(0.0, |f| unsafe { f() })
    }

    pub fn window_width(&self) -> u32 {
        self.get_window_width.map_or(0, |f| unsafe { f() })
    }

    pub fn window_height(&self) -> u32 {
        self.get_window_height.map_or(0, |f| unsafe { f() })
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus.map_or(false, |f| unsafe { f() })
    }

    pub fn char_input_count(&self) -> u32 {
        self.get_char_input_count.map_or(0, |f| unsafe { f() })
    }

    pub fn char_input_at(&self, index: u32) -> u32 {
        self.get_char_input_at.map_or(0, |f| unsafe { f(index) })
    }

    pub fn get_world_translation(&self, owner: EntityAddress) -> Option<Vector3> {
        let f = self.get_world_translation?;
        let mut value = Vector3::ZERO;
        let found = unsafe {
            f(
                owner.world_id(),
                owner.index(),
                owner.generation(),
                &mut value,
            )
        };
        found.then_some(value)
    }

    pub fn set_world_translation(&self, owner: EntityAddress, value: Vector3) -> bool {
        let Some(f) = self.set_world_translation else {
            return false;
        };
        let mut buffer = value;
        unsafe {
            f(
                owner.world_id(),
                owner.index(),
                owner.generation(),
                &mut buffer,
            )
        }
    }
}
