//! Latch Services Layer
//!
//! Platform vocabulary shared by the host and scripts: input codes and
//! scripting settings.

pub mod input;
pub mod settings;

pub use input::{Key, MouseButton};
pub use settings::{ScriptSettings, SettingsError};
