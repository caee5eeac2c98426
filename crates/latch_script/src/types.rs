//! Script type descriptors and the in-process type registry
//!
//! A [`ScriptType`] names something a module exports and says whether it can
//! be instantiated as a [`ScriptComponent`]. Types linked into the bridge
//! itself live in a process-wide registry consulted before any module is
//! loaded from disk.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::boundary::{contain, Failure};
use crate::component::ScriptComponent;
use crate::error::{BridgeError, ScriptError};

/// Constructs a fresh, identity-less component.
pub type ComponentFactory = fn() -> Result<Box<dyn ScriptComponent>, ScriptError>;

#[derive(Clone, Copy)]
pub enum ScriptTypeKind {
    /// Satisfies the component contract and can be instantiated.
    Component(ComponentFactory),
    /// Exported, but not a component (data types, helpers).
    Plain,
}

/// Named, exported script type.
#[derive(Clone, Copy)]
pub struct ScriptType {
    name: &'static str,
    kind: ScriptTypeKind,
}

fn default_factory<T: ScriptComponent + Default>() -> Result<Box<dyn ScriptComponent>, ScriptError>
{
    Ok(Box::new(T::default()))
}

impl ScriptType {
    pub const fn component(name: &'static str, factory: ComponentFactory) -> Self {
        Self {
            name,
            kind: ScriptTypeKind::Component(factory),
        }
    }

    /// Component constructed through `Default`.
    pub const fn of<T: ScriptComponent + Default>(name: &'static str) -> Self {
        Self::component(name, default_factory::<T>)
    }

    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: ScriptTypeKind::Plain,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ScriptTypeKind {
        self.kind
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, ScriptTypeKind::Component(_))
    }

    /// Construct a new component of this type.
    ///
    /// Fails if the type is not a component or if its factory errors or
    /// panics. `requested` is the name the caller asked for, used in errors.
    pub fn instantiate(&self, requested: &str) -> Result<Box<dyn ScriptComponent>, BridgeError> {
        let ScriptTypeKind::Component(factory) = self.kind else {
            return Err(BridgeError::NotAComponent {
                type_name: requested.to_string(),
            });
        };

        let construction = |failure: Failure| BridgeError::Construction {
            type_name: requested.to_string(),
            kind: failure.kind,
            message: failure.message,
        };

        match contain(factory) {
            Ok(Ok(component)) => Ok(component),
            Ok(Err(err)) => Err(construction(err.into())),
            Err(failure) => Err(construction(failure)),
        }
    }
}

impl std::fmt::Debug for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptType")
            .field("name", &self.name)
            .field("component", &self.is_component())
            .finish()
    }
}

/// Types linked into this process, keyed by exact name.
static SCRIPT_TYPES: Lazy<RwLock<HashMap<String, ScriptType>>> = Lazy::new(|| {
    let builtins = crate::demo::builtin_types()
        .iter()
        .map(|ty| (ty.name().to_string(), *ty))
        .collect();
    RwLock::new(builtins)
});

/// Make a type resolvable by name without loading any module.
///
/// Re-registering a name replaces the previous entry.
pub fn register_script_type(ty: ScriptType) {
    SCRIPT_TYPES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(ty.name().to_string(), ty);
}

/// Look up a type linked into this process.
pub fn lookup_script_type(name: &str) -> Option<ScriptType> {
    SCRIPT_TYPES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .copied()
}

/// Build a [`ScriptType`] for a component implementing `Default`.
///
/// # Example
/// ```ignore
/// register_script_type(script_type!(Spinner));
/// register_script_type(script_type!(Spinner, "demo::Spinner"));
/// ```
#[macro_export]
macro_rules! script_type {
    ($ty:ty) => {
        $crate::types::ScriptType::of::<$ty>(stringify!($ty))
    };
    ($ty:ty, $name:expr) => {
        $crate::types::ScriptType::of::<$ty>($name)
    };
}
