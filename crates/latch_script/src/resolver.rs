//! Type resolution
//!
//! Turns a textual type identifier (optionally `Type, Module`) plus an optional
//! module path into a [`ScriptType`]. Lookup order:
//!
//! 1. types linked into this process, by full name
//! 2. when the hint names this process (the bridge crate or the executable),
//!    types linked into it by simple name, and nothing else
//! 3. an already-loaded module whose name matches the module hint
//! 4. types linked into this process, by simple name
//! 5. `<base_dir>/<hint>.<ext>` next to the executable
//! 6. the explicit module path
//!
//! Inside a module the full name is tried first, then the simple name. A miss
//! logs a bounded sample of what the module does export.

use latch_services::ScriptSettings;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::boundary::{contain, contain_result, Failure};
use crate::module::{ModuleLoader, ScriptModule};
use crate::native;
use crate::types::{lookup_script_type, ScriptType};

/// A type identifier split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    full: &'a str,
    simple: &'a str,
    module_hint: Option<&'a str>,
}

impl<'a> QualifiedName<'a> {
    /// Split on the first `,`. Anything after a second `,` (version, culture)
    /// is ignored for the hint.
    pub fn parse(text: &'a str) -> Self {
        match text.split_once(',') {
            Some((simple, rest)) => {
                let hint = rest.split(',').next().unwrap_or_default().trim();
                Self {
                    full: text,
                    simple: simple.trim(),
                    module_hint: (!hint.is_empty()).then_some(hint),
                }
            }
            None => Self {
                full: text,
                simple: text,
                module_hint: None,
            },
        }
    }

    pub fn full(&self) -> &'a str {
        self.full
    }

    pub fn simple(&self) -> &'a str {
        self.simple
    }

    pub fn module_hint(&self) -> Option<&'a str> {
        self.module_hint
    }
}

/// Directory of the running executable, if it can be determined.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Whether a module hint names code linked into this process: the bridge
/// crate itself or the running executable.
pub fn is_process_module(hint: &str) -> bool {
    if hint.eq_ignore_ascii_case(env!("CARGO_PKG_NAME")) {
        return true;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .is_some_and(|stem| stem.eq_ignore_ascii_case(hint))
}

/// Base directory for relative module paths: settings override, then the
/// executable's directory, then the working directory.
pub fn discover_base_dir(settings: &ScriptSettings) -> PathBuf {
    settings
        .base_dir
        .clone()
        .or_else(executable_dir)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

pub struct TypeResolver {
    loader: Box<dyn ModuleLoader>,
    base_dir: PathBuf,
    module_extension: String,
    diagnostic_sample: usize,
    // Keyed by lower-cased normalized absolute path.
    modules: HashMap<String, Arc<dyn ScriptModule>>,
    load_count: usize,
}

impl TypeResolver {
    pub fn new(loader: Box<dyn ModuleLoader>, settings: &ScriptSettings) -> Self {
        Self {
            loader,
            base_dir: discover_base_dir(settings),
            module_extension: settings.module_extension.clone(),
            diagnostic_sample: settings.diagnostic_type_sample,
            modules: HashMap::new(),
            load_count: 0,
        }
    }

    /// Apply new settings. Loaded modules stay cached.
    pub fn configure(&mut self, settings: &ScriptSettings) {
        self.base_dir = discover_base_dir(settings);
        self.module_extension = settings.module_extension.clone();
        self.diagnostic_sample = settings.diagnostic_type_sample;
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of modules actually loaded through the loader.
    pub fn load_count(&self) -> usize {
        self.load_count
    }

    pub fn loaded_modules(&self) -> impl Iterator<Item = &Arc<dyn ScriptModule>> {
        self.modules.values()
    }

    /// Resolve a type. Never fails loudly: every problem is logged and turns
    /// into `None`.
    pub fn resolve(&mut self, type_name: &str, module_path: Option<&str>) -> Option<ScriptType> {
        let name = QualifiedName::parse(type_name);

        if let Some(ty) = lookup_script_type(name.full()) {
            return Some(ty);
        }

        let path = match module_path.filter(|p| !p.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => {
                let hint = name.module_hint()?;
                if is_process_module(hint) {
                    return lookup_script_type(name.simple());
                }
                if let Some(module) = self.loaded_module_named(hint) {
                    return self.find_in_module(module.as_ref(), &name);
                }
                if let Some(ty) = lookup_script_type(name.simple()) {
                    return Some(ty);
                }
                self.sibling_module(hint)?
            }
        };

        let module = match contain_result(|| self.load_cached(&path)) {
            Ok(module) => module,
            Err(failure) => {
                native::log_error(&format!("ResolveType failed: {failure}"));
                return None;
            }
        };

        match contain(|| self.find_in_module(module.as_ref(), &name)) {
            Ok(found) => found,
            Err(failure) => {
                native::log_error(&format!("ResolveType failed: {failure}"));
                None
            }
        }
    }

    fn loaded_module_named(&self, hint: &str) -> Option<Arc<dyn ScriptModule>> {
        self.modules
            .values()
            .find(|module| module.name().eq_ignore_ascii_case(hint))
            .cloned()
    }

    /// `<base_dir>/<hint>.<ext>`, also trying the platform library prefix.
    fn sibling_module(&self, hint: &str) -> Option<PathBuf> {
        let file_name = if self.module_extension.is_empty() {
            hint.to_string()
        } else {
            format!("{hint}.{}", self.module_extension)
        };
        let prefix = std::env::consts::DLL_PREFIX;

        std::iter::once(file_name.clone())
            .chain((!prefix.is_empty()).then(|| format!("{prefix}{file_name}")))
            .map(|file| self.base_dir.join(file))
            .find(|candidate| candidate.is_file())
    }

    fn load_cached(&mut self, path: &Path) -> Result<Arc<dyn ScriptModule>, Failure> {
        let absolute = if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.base_dir.join(path))
        };
        let key = absolute.to_string_lossy().to_lowercase();

        if let Some(module) = self.modules.get(&key) {
            return Ok(module.clone());
        }

        let module = self.loader.load(&absolute)?;
        self.load_count += 1;
        tracing::info!(
            target: "latch_script",
            "Loaded script module '{}' from {}",
            module.name(),
            absolute.display()
        );
        self.modules.insert(key, module.clone());
        Ok(module)
    }

    fn find_in_module(&self, module: &dyn ScriptModule, name: &QualifiedName<'_>) -> Option<ScriptType> {
        if let Some(ty) = module.find_type(name.full()) {
            return Some(ty);
        }
        if name.simple() != name.full() {
            if let Some(ty) = module.find_type(name.simple()) {
                return Some(ty);
            }
        }

        self.report_miss(module);
        None
    }

    fn report_miss(&self, module: &dyn ScriptModule) {
        let listing = contain_result(|| {
            module.type_names().map(|names| {
                let sample = names
                    .iter()
                    .take(self.diagnostic_sample)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ");
                (names.len(), sample)
            })
        });

        match listing {
            Ok((count, sample)) => native::log_info(&format!(
                "ResolveType miss. Module='{}' Location='{}' Types={} Sample=[{}]",
                module.name(),
                module.location().display(),
                count,
                sample
            )),
            Err(failure) => {
                native::log_error(&format!("ResolveType failed to enumerate types: {failure}"))
            }
        }
    }
}
