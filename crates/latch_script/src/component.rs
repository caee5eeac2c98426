//! The script component contract
//!
//! Every script type implements [`ScriptComponent`]. All hooks are opt-in: the
//! default bodies do nothing and succeed.

use crate::context::ScriptContext;
use crate::error::ScriptResult;

/// Behavior attached to a host entity.
///
/// Identity (handle, owner, world) is assigned by the bridge at creation and is
/// read through the [`ScriptContext`] passed to each hook; implementations
/// cannot change it.
///
/// Returning an error (or panicking) from a hook is contained by the
/// dispatcher: it is logged and the host continues with the next call.
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct Spin { angle: f32 }
///
/// impl ScriptComponent for Spin {
///     fn tick(&mut self, ctx: &ScriptContext<'_>, dt: f32) -> ScriptResult {
///         self.angle += dt;
///         ctx.try_set_world_position(Vector3::new(self.angle.cos(), 0.0, self.angle.sin()));
///         Ok(())
///     }
/// }
/// ```
pub trait ScriptComponent: Send + 'static {
    /// Called once after the host attaches the instance.
    fn on_create(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Called before the host detaches the instance.
    fn on_destroy(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    fn on_enable(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    fn on_disable(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
        Ok(())
    }

    /// Per-frame update. `dt` is passed through from the host unvalidated.
    fn tick(&mut self, _ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
        Ok(())
    }
}

/// Lifecycle call routed to an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifecycle {
    Create,
    Destroy,
    Enable,
    Disable,
    Tick(f32),
}

impl Lifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Create => "OnCreate",
            Lifecycle::Destroy => "OnDestroy",
            Lifecycle::Enable => "OnEnable",
            Lifecycle::Disable => "OnDisable",
            Lifecycle::Tick(_) => "Tick",
        }
    }

    /// Invoke the matching hook on `component`.
    pub fn invoke(
        self,
        component: &mut dyn ScriptComponent,
        ctx: &ScriptContext<'_>,
    ) -> ScriptResult {
        match self {
            Lifecycle::Create => component.on_create(ctx),
            Lifecycle::Destroy => component.on_destroy(ctx),
            Lifecycle::Enable => component.on_enable(ctx),
            Lifecycle::Disable => component.on_disable(ctx),
            Lifecycle::Tick(dt) => component.tick(ctx, dt),
        }
    }
}
