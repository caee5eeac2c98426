//! Engine side of the script bridge
//!
//! Fills the bridge's `NativeApi` with callbacks backed by a simulated frame
//! of input and a translation store keyed by entity address.

use latch_core::{EntityAddress, Vector3};
use latch_script::marshal::native_utf8_to_string;
use latch_script::NativeApi;
use latch_services::{Key, MouseButton};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::ffi::c_char;
use std::sync::{Mutex, PoisonError};

/// Input for the current frame.
#[derive(Debug, Default, Clone)]
pub struct FrameInput {
    pub keys_down: HashSet<Key>,
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_down: HashSet<u32>,
    pub buttons_pressed: HashSet<u32>,
    pub buttons_released: HashSet<u32>,
    pub mouse: (i32, i32),
    pub mouse_delta: (i32, i32),
    pub wheel: f32,
    pub window: (u32, u32),
    pub focused: bool,
    pub chars: Vec<char>,
}

impl FrameInput {
    pub fn press(&mut self, key: Key) {
        self.keys_down.insert(key);
        self.keys_pressed.insert(key);
    }

    pub fn click(&mut self, button: MouseButton) {
        self.buttons_down.insert(button.index());
        self.buttons_pressed.insert(button.index());
    }

    pub fn move_mouse_to(&mut self, x: i32, y: i32) {
        self.mouse_delta = (x - self.mouse.0, y - self.mouse.1);
        self.mouse = (x, y);
    }
}

static INPUT: Lazy<Mutex<FrameInput>> = Lazy::new(|| {
    Mutex::new(FrameInput {
        window: (1280, 720),
        focused: true,
        ..Default::default()
    })
});

static TRANSLATIONS: Lazy<Mutex<HashMap<EntityAddress, Vector3>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Replace the frame input, keeping held keys and buttons down.
pub fn begin_frame(update: impl FnOnce(&mut FrameInput)) {
    let mut input = INPUT.lock().unwrap_or_else(PoisonError::into_inner);
    input.keys_pressed.clear();
    input.keys_released.clear();
    input.buttons_pressed.clear();
    input.buttons_released.clear();
    input.mouse_delta = (0, 0);
    input.wheel = 0.0;
    input.chars.clear();
    update(&mut input);
}

pub fn spawn(owner: EntityAddress, position: Vector3) {
    translations().insert(owner, position);
}

pub fn translation(owner: EntityAddress) -> Option<Vector3> {
    translations().get(&owner).copied()
}

fn translations() -> std::sync::MutexGuard<'static, HashMap<EntityAddress, Vector3>> {
    TRANSLATIONS.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_input<R>(f: impl FnOnce(&FrameInput) -> R) -> R {
    f(&INPUT.lock().unwrap_or_else(PoisonError::into_inner))
}

unsafe extern "C" fn log_info(message: *const c_char) {
    if let Some(message) = unsafe { native_utf8_to_string(message) } {
        tracing::info!(target: "script", "{message}");
    }
}

unsafe extern "C" fn log_error(message: *const c_char) {
    if let Some(message) = unsafe { native_utf8_to_string(message) } {
        tracing::error!(target: "script", "{message}");
    }
}

fn key_in(set: impl FnOnce(&FrameInput) -> &HashSet<Key>, code: u16) -> bool {
    let Some(key) = Key::from_code(code) else {
        return false;
    };
    with_input(|input| set(input).contains(&key))
}

unsafe extern "C" fn is_key_down(code: u16) -> bool {
    key_in(|input| &input.keys_down, code)
}

unsafe extern "C" fn was_key_pressed(code: u16) -> bool {
    key_in(|input| &input.keys_pressed, code)
}

unsafe extern "C" fn was_key_released(code: u16) -> bool {
    key_in(|input| &input.keys_released, code)
}

unsafe extern "C" fn is_mouse_button_down(button: u32) -> bool {
    with_input(|input| input.buttons_down.contains(&button))
}

unsafe extern "C" fn was_mouse_button_pressed(button: u32) -> bool {
    with_input(|input| input.buttons_pressed.contains(&button))
}

unsafe extern "C" fn was_mouse_button_released(button: u32) -> bool {
    with_input(|input| input.buttons_released.contains(&button))
}

unsafe extern "C" fn get_mouse_x() -> i32 {
    with_input(|input| input.mouse.0)
}

unsafe extern "C" fn get_mouse_y() -> i32 {
    with_input(|input| input.mouse.1)
}

unsafe extern "C" fn get_mouse_delta_x() -> i32 {
    with_input(|input| input.mouse_delta.0)
}

unsafe extern "C" fn get_mouse_delta_y() -> i32 {
    with_input(|input| input.mouse_delta.1)
}

unsafe extern "C" fn get_mouse_wheel_delta() -> f32 {
    with_input(|input| input.wheel)
}

unsafe extern "C" fn get_window_width() -> u32 {
    with_input(|input| input.window.0)
}

unsafe extern "C" fn get_window_height() -> u32 {
    with_input(|input| input.window.1)
}

unsafe extern "C" fn has_focus() -> bool {
    with_input(|input| input.focused)
}

unsafe extern "C" fn get_char_input_count() -> u32 {
    with_input(|input| input.chars.len() as u32)
}

unsafe extern "C" fn get_char_input_at(index: u32) -> u32 {
    with_input(|input| input.chars.get(index as usize).map_or(0, |c| *c as u32))
}

unsafe extern "C" fn get_world_translation(
    world_id: u32,
    owner_index: u32,
    owner_generation: u32,
    value: *mut Vector3,
) -> bool {
    let owner = EntityAddress::new(world_id, owner_index, owner_generation);
    match (translation(owner), unsafe { value.as_mut() }) {
        (Some(stored), Some(out)) => {
            *out = stored;
            true
        }
        _ => false,
    }
}

unsafe extern "C" fn set_world_translation(
    world_id: u32,
    owner_index: u32,
    owner_generation: u32,
    value: *mut Vector3,
) -> bool {
    let owner = EntityAddress::new(world_id, owner_index, owner_generation);
    let Some(value) = (unsafe { value.as_ref() }) else {
        return false;
    };
    match translations().get_mut(&owner) {
        Some(slot) => {
            *slot = *value;
            true
        }
        None => false,
    }
}

/// Capability table handed to `latch_script_startup`.
pub fn native_api() -> NativeApi {
    NativeApi {
        log_info: Some(log_info),
        log_error: Some(log_error),
        is_key_down: Some(is_key_down),
        was_key_pressed: Some(was_key_pressed),
        was_key_released: Some(was_key_released),
        is_mouse_button_down: Some(is_mouse_button_down),
        was_mouse_button_pressed: Some(was_mouse_button_pressed),
        was_mouse_button_released: Some(was_mouse_button_released),
        get_mouse_x: Some(get_mouse_x),
        get_mouse_y: Some(get_mouse_y),
        get_mouse_delta_x: Some(get_mouse_delta_x),
        get_mouse_delta_y: Some(get_mouse_delta_y),
        get_mouse_wheel_delta: Some(get_mouse_wheel_delta),
        get_window_width: Some(get_window_width),
        get_window_height: Some(get_window_height),
        has_focus: Some(has_focus),
        get_char_input_count: Some(get_char_input_count),
        get_char_input_at: Some(get_char_input_at),
        get_world_translation: Some(get_world_translation),
        set_world_translation: Some(set_world_translation),
    }
}
