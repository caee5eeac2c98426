//! Demo script module
//!
//! Built as a dynamic library and resolved by path or by `Type, Module` name:
//!
//! ```text
//! type name:   demo::Spinner, latch_script_demo
//! module path: <exe dir>/liblatch_script_demo.so
//! ```

use latch_core::glam::{Quat, Vec3};
use latch_script::types::ScriptType;
use latch_script::{Key, ScriptComponent, ScriptContext, ScriptError, ScriptResult, Vector3};

latch_script::export_script_module!(
    latch_script::script_type!(Spinner, "demo::Spinner"),
    latch_script::script_type!(Echo, "demo::Echo"),
    ScriptType::plain("demo::SpinSettings"),
);

/// Orbits the owner around the point it started at.
pub struct Spinner {
    radius: f32,
    speed: f32,
    angle: f32,
    center: Option<Vec3>,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            radius: 2.0,
            speed: std::f32::consts::FRAC_PI_2,
            angle: 0.0,
            center: None,
        }
    }
}

impl Spinner {
    fn offset(&self) -> Vec3 {
        Quat::from_rotation_y(self.angle) * Vec3::new(self.radius, 0.0, 0.0)
    }
}

impl ScriptComponent for Spinner {
    fn on_create(&mut self, ctx: &ScriptContext<'_>) -> ScriptResult {
        let start = ctx
            .try_get_world_position()
            .ok_or_else(|| ScriptError::not_found(format!("no transform for {}", ctx.owner())))?;
        self.center = Some(Vec3::from(start));
        ctx.log_info(&format!("[Spinner] orbiting around {:?}", start.to_array()));
        Ok(())
    }

    fn tick(&mut self, ctx: &ScriptContext<'_>, dt: f32) -> ScriptResult {
        let Some(center) = self.center else {
            return Ok(());
        };

        if ctx.input().was_key_pressed(Key::R) {
            self.speed = -self.speed;
        }
        self.angle = (self.angle + self.speed * dt) % std::f32::consts::TAU;

        if !ctx.try_set_world_position(Vector3::from(center + self.offset())) {
            return Err(ScriptError::invalid_state("host rejected translation"));
        }
        Ok(())
    }

    fn on_destroy(&mut self, ctx: &ScriptContext<'_>) -> ScriptResult {
        if let Some(center) = self.center {
            ctx.try_set_world_position(Vector3::from(center));
        }
        Ok(())
    }
}

/// Logs typed text back to the host.
#[derive(Default)]
pub struct Echo {
    line: String,
}

impl ScriptComponent for Echo {
    fn tick(&mut self, ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
        let input = ctx.input();
        self.line.extend(input.chars().filter(|c| !c.is_control()));

        if input.was_key_pressed(Key::Enter) && !self.line.is_empty() {
            ctx.log_info(&format!("[Echo] {}", self.line));
            self.line.clear();
        }
        Ok(())
    }

    fn on_disable(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        self.line.clear();
        Ok(())
    }
}
