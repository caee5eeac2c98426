//! Script modules: deployable units that export script types
//!
//! A module is a dynamic library built against this crate. It exposes one
//! entry symbol returning a [`ModuleExport`] that points at a static table of
//! [`ScriptType`]s. Modules must be built with the same toolchain as the
//! bridge, since component vtables cross the library boundary.

use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::BridgeError;
use crate::types::ScriptType;

/// ABI version - bump when `ModuleExport` or `ScriptType` change shape.
pub const SCRIPT_ABI_VERSION: u32 = 1;

/// Entry symbol every script module exports.
pub const MODULE_ENTRY_SYMBOL: &[u8] = b"latch_script_module\0";

/// Type table returned by a module's entry symbol.
#[repr(C)]
pub struct ModuleExport {
    pub abi_version: u32,
    pub type_count: usize,
    pub types: *const ScriptType,
}

impl ModuleExport {
    pub const fn new(types: &'static [ScriptType]) -> Self {
        Self {
            abi_version: SCRIPT_ABI_VERSION,
            type_count: types.len(),
            types: types.as_ptr(),
        }
    }
}

pub type ModuleEntryFn = unsafe extern "C" fn() -> ModuleExport;

/// Generate the module entry symbol for a script module crate.
///
/// # Example
/// ```ignore
/// latch_script::export_script_module!(
///     latch_script::script_type!(Spinner, "demo::Spinner"),
///     latch_script::types::ScriptType::plain("demo::SpinSettings"),
/// );
/// ```
#[macro_export]
macro_rules! export_script_module {
    ($($ty:expr),* $(,)?) => {
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn latch_script_module() -> $crate::module::ModuleExport {
            static TYPES: &[$crate::types::ScriptType] = &[$($ty),*];
            $crate::module::ModuleExport::new(TYPES)
        }
    };
}

/// A loaded module the resolver can search.
pub trait ScriptModule: Send + Sync {
    /// Short module name, matched against `Type, Module` hints.
    fn name(&self) -> &str;

    /// Where the module was loaded from.
    fn location(&self) -> &Path;

    /// Exact-name lookup.
    fn find_type(&self, name: &str) -> Option<ScriptType>;

    /// Names of every exported type, in export order.
    fn type_names(&self) -> Result<Vec<&str>, BridgeError>;
}

/// Seam between the resolver and the platform loader.
pub trait ModuleLoader: Send {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn ScriptModule>, BridgeError>;
}

/// Module name for a library path: file stem without the platform prefix.
pub fn module_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = std::env::consts::DLL_PREFIX;
    match stem.strip_prefix(prefix) {
        Some(rest) if !prefix.is_empty() && !rest.is_empty() => rest.to_string(),
        _ => stem,
    }
}

/// Module backed by a dynamic library.
pub struct LibraryModule {
    name: String,
    location: PathBuf,
    types: &'static [ScriptType],
    // Keeps `types` (and every factory it points at) mapped.
    _library: Library,
}

impl ScriptModule for LibraryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        &self.location
    }

    fn find_type(&self, name: &str) -> Option<ScriptType> {
        self.types.iter().find(|ty| ty.name() == name).copied()
    }

    fn type_names(&self) -> Result<Vec<&str>, BridgeError> {
        Ok(self.types.iter().map(|ty| ty.name()).collect())
    }
}

/// Loads modules with `libloading`.
#[derive(Debug, Default)]
pub struct LibraryLoader;

impl ModuleLoader for LibraryLoader {
    fn load(&mut self, path: &Path) -> Result<Arc<dyn ScriptModule>, BridgeError> {
        let library = unsafe { Library::new(path) }.map_err(|e| BridgeError::ModuleLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let export = {
            let entry: Symbol<ModuleEntryFn> = unsafe { library.get(MODULE_ENTRY_SYMBOL) }
                .map_err(|_| BridgeError::MissingEntryPoint {
                    path: path.to_path_buf(),
                })?;
            unsafe { entry() }
        };

        if export.abi_version != SCRIPT_ABI_VERSION {
            return Err(BridgeError::AbiMismatch {
                path: path.to_path_buf(),
                expected: SCRIPT_ABI_VERSION,
                found: export.abi_version,
            });
        }

        let types: &'static [ScriptType] = if export.type_count == 0 {
            &[]
        } else if export.types.is_null() {
            return Err(BridgeError::InvalidTypeTable {
                path: path.to_path_buf(),
            });
        } else {
            // The table is a static inside the library, which stays loaded
            // for as long as this module exists.
            unsafe { std::slice::from_raw_parts(export.types, export.type_count) }
        };

        tracing::debug!(
            target: "latch_script",
            "Loaded script module {} ({} types)",
            path.display(),
            types.len()
        );

        Ok(Arc::new(LibraryModule {
            name: module_name_from_path(path),
            location: path.to_path_buf(),
            types,
            _library: library,
        }))
    }
}

/// In-memory module, for hosts that embed their script types directly.
pub struct StaticModule {
    name: String,
    location: PathBuf,
    types: Vec<ScriptType>,
}

impl StaticModule {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: ScriptType) -> Self {
        self.types.push(ty);
        self
    }
}

impl ScriptModule for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        &self.location
    }

    fn find_type(&self, name: &str) -> Option<ScriptType> {
        self.types.iter().find(|ty| ty.name() == name).copied()
    }

    fn type_names(&self) -> Result<Vec<&str>, BridgeError> {
        Ok(self.types.iter().map(|ty| ty.name()).collect())
    }
}
