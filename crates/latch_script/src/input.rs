//! Input queries for scripts
//!
//! Thin pass-through to the host table; absent capabilities read as
//! "not pressed", zero, or no focus.

use latch_services::Key;

use crate::abi::NativeApi;

#[derive(Clone, Copy)]
pub struct Input<'a> {
    api: &'a NativeApi,
}

impl<'a> Input<'a> {
    pub fn new(api: &'a NativeApi) -> Self {
        Self { api }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.api.is_key_down(key)
    }

    pub fn was_key_pressed(&self, key: Key) -> bool {
        self.api.was_key_pressed(key)
    }

    pub fn was_key_released(&self, key: Key) -> bool {
        self.api.was_key_released(key)
    }

    pub fn is_mouse_button_down(&self, button: impl Into<u32>) -> bool {
        self.api.is_mouse_button_down(button.into())
    }

    pub fn was_mouse_button_pressed(&self, button: impl Into<u32>) -> bool {
        self.api.was_mouse_button_pressed(button.into())
    }

    pub fn was_mouse_button_released(&self, button: impl Into<u32>) -> bool {
        self.api.was_mouse_button_released(button.into())
    }

    pub fn mouse_x(&self) -> i32 {
        self.api.mouse_x()
    }

    pub fn mouse_y(&self) -> i32 {
        self.api.mouse_y()
    }

    pub fn mouse_position(&self) -> (i32, i32) {
        (self.mouse_x(), self.mouse_y())
    }

    pub fn mouse_delta(&self) -> (i32, i32) {
        (self.api.mouse_delta_x(), self.api.mouse_delta_y())
    }

    pub fn mouse_wheel_delta(&self) -> f32 {
        self.api.mouse_wheel_delta()
    }

    pub fn window_width(&self) -> u32 {
        self.api.window_width()
    }

    pub fn window_height(&self) -> u32 {
        self.api.window_height()
    }

    pub fn has_focus(&self) -> bool {
        self.api.has_focus()
    }

    /// Number of character events buffered this frame.
    pub fn char_input_count(&self) -> u32 {
        self.api.char_input_count()
    }

    /// Raw codepoint of the `index`-th character event (0 if unavailable).
    pub fn char_input_at(&self, index: u32) -> u32 {
        self.api.char_input_at(index)
    }

    /// This frame's text input; invalid codepoints are skipped.
    pub fn chars(&self) -> impl Iterator<Item = char> + 'a {
        let api = self.api;
        (0..api.char_input_count()).filter_map(move |i| char::from_u32(api.char_input_at(i)))
    }
}
