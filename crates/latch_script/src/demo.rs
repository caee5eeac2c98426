//! Built-in demo script
//!
//! Linked into the bridge so a host can exercise the whole path with nothing
//! but a type name.

use latch_services::Key;

use crate::component::ScriptComponent;
use crate::context::ScriptContext;
use crate::error::ScriptResult;
use crate::types::ScriptType;

static BUILTIN_TYPES: [ScriptType; 1] = [crate::script_type!(DemoScript)];

/// Types every process can resolve without loading a module.
pub fn builtin_types() -> &'static [ScriptType] {
    &BUILTIN_TYPES
}

/// Logs its owner on create and the mouse position once per second.
#[derive(Debug, Default)]
pub struct DemoScript {
    elapsed: f32,
    logged_create: bool,
}

impl ScriptComponent for DemoScript {
    fn on_create(&mut self, ctx: &ScriptContext<'_>) -> ScriptResult {
        if self.logged_create {
            return Ok(());
        }
        self.logged_create = true;
        ctx.log_info(&format!("[DemoScript] OnCreate {}", ctx.owner()));
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &ScriptContext<'_>) -> ScriptResult {
        ctx.log_info("[DemoScript] OnDestroy");
        Ok(())
    }

    fn tick(&mut self, ctx: &ScriptContext<'_>, dt: f32) -> ScriptResult {
        let input = ctx.input();

        self.elapsed += dt;
        if self.elapsed >= 1.0 {
            self.elapsed = 0.0;
            let (x, y) = input.mouse_position();
            ctx.log_info(&format!("[DemoScript] Tick mouse=({x},{y})"));
        }

        if input.was_key_pressed(Key::Space) {
            ctx.log_info("[DemoScript] Space pressed");
        }
        Ok(())
    }
}
