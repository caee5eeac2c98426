//! Script host: instance registry plus type resolver
//!
//! Lifecycle per handle is `absent -> live -> absent`. Calls on a handle that
//! is not live are ignored without logging; the host may legitimately call
//! into destroyed instances while tearing down.

use latch_core::EntityAddress;
use latch_services::ScriptSettings;
use std::sync::TryLockError;

use crate::abi::NativeApi;
use crate::boundary::{contain_result, Failure};
use crate::component::Lifecycle;
use crate::context::ScriptContext;
use crate::error::BridgeError;
use crate::module::LibraryLoader;
use crate::native;
use crate::registry::{InstanceHandle, InstanceRegistry, SharedInstance};
use crate::resolver::TypeResolver;

/// What to instantiate and where to attach it.
#[derive(Debug, Clone, Copy)]
pub struct CreateRequest<'a> {
    pub type_name: Option<&'a str>,
    pub module_path: Option<&'a str>,
    pub owner: EntityAddress,
}

impl<'a> CreateRequest<'a> {
    pub fn new(type_name: &'a str, owner: EntityAddress) -> Self {
        Self {
            type_name: Some(type_name),
            module_path: None,
            owner,
        }
    }

    pub fn with_module_path(mut self, path: &'a str) -> Self {
        self.module_path = Some(path);
        self
    }
}

pub struct ScriptHost {
    registry: InstanceRegistry,
    resolver: TypeResolver,
}

impl ScriptHost {
    pub fn new(resolver: TypeResolver) -> Self {
        Self {
            registry: InstanceRegistry::new(),
            resolver,
        }
    }

    /// Host that loads modules from dynamic libraries.
    pub fn with_settings(settings: &ScriptSettings) -> Self {
        Self::new(TypeResolver::new(Box::new(LibraryLoader), settings))
    }

    pub fn configure(&mut self, settings: &ScriptSettings) {
        self.resolver.configure(settings);
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Resolve, construct and register a new instance.
    pub fn create_instance(
        &mut self,
        request: &CreateRequest<'_>,
    ) -> Result<InstanceHandle, BridgeError> {
        let type_name = request
            .type_name
            .filter(|name| !name.is_empty())
            .ok_or(BridgeError::MissingTypeName)?;

        let ty = self
            .resolver
            .resolve(type_name, request.module_path)
            .ok_or_else(|| BridgeError::TypeNotFound {
                type_name: type_name.to_string(),
            })?;

        let component = ty.instantiate(type_name)?;
        let handle = self.registry.insert(request.owner, ty.name(), component);

        tracing::debug!(
            target: "latch_script",
            %handle,
            type_name = ty.name(),
            "Created script instance ({})",
            request.owner
        );
        Ok(handle)
    }

    /// Drop an instance. Unknown handles are ignored.
    pub fn destroy_instance(&mut self, handle: InstanceHandle) -> bool {
        let removed = self.registry.remove(handle);
        if removed {
            tracing::debug!(target: "latch_script", %handle, "Destroyed script instance");
        }
        removed
    }

    pub fn instance(&self, handle: InstanceHandle) -> Option<SharedInstance> {
        self.registry.get(handle)
    }

    /// Run a lifecycle hook using the captured host table.
    ///
    /// The instance stays borrowed from the registry for the duration of the
    /// call, so the hook cannot observe this host. Hosts that need hooks to
    /// re-enter (destroy from inside a tick) should look the instance up and
    /// call [`invoke`] with no lock held.
    pub fn dispatch(&self, handle: InstanceHandle, call: Lifecycle) {
        if let Some(instance) = self.instance(handle) {
            invoke(&instance, call, &native::current());
        }
    }
}

/// Run one hook on `instance`, logging any failure to the host.
///
/// Returns `false` when the hook failed.
pub fn invoke(instance: &SharedInstance, call: Lifecycle, api: &NativeApi) -> bool {
    match run_hook(instance, call, api) {
        Ok(()) => true,
        Err(failure) => {
            tracing::warn!(target: "latch_script", hook = call.name(), "{failure}");
            api.log_error(&format!("Script exception: {failure}"));
            false
        }
    }
}

fn run_hook(instance: &SharedInstance, call: Lifecycle, api: &NativeApi) -> Result<(), Failure> {
    let mut guard = match instance.try_lock() {
        Ok(guard) => guard,
        // Poisoned by a panic outside the hook boundary; the component is intact.
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => {
            return Err(Failure::new(
                "InvalidState",
                format!("{} re-entered while another hook is running", call.name()),
            ))
        }
    };

    let (identity, component) = guard.parts_mut();
    let ctx = ScriptContext::new(identity, api);
    contain_result(|| call.invoke(component, &ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ScriptComponent;
    use crate::error::{ScriptError, ScriptResult};
    use crate::module::ModuleLoader;
    use crate::module::ScriptModule;
    use crate::types::{register_script_type, ScriptType};
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct NoModules;

    impl ModuleLoader for NoModules {
        fn load(&mut self, path: &Path) -> Result<Arc<dyn ScriptModule>, BridgeError> {
            Err(BridgeError::ModuleLoad {
                path: path.to_path_buf(),
                message: "no modules in tests".into(),
            })
        }
    }

    fn host() -> ScriptHost {
        ScriptHost::new(TypeResolver::new(
            Box::new(NoModules),
            &ScriptSettings::default(),
        ))
    }

    static RECORDED_DT: Mutex<Vec<f32>> = Mutex::new(Vec::new());

    #[derive(Default)]
    struct Recorder;

    impl ScriptComponent for Recorder {
        fn tick(&mut self, _ctx: &ScriptContext<'_>, dt: f32) -> ScriptResult {
            RECORDED_DT.lock().unwrap().push(dt);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Faulty;

    impl ScriptComponent for Faulty {
        fn on_enable(&mut self, _ctx: &ScriptContext<'_>) -> ScriptResult {
            Err(ScriptError::invalid_state("not ready"))
        }

        fn tick(&mut self, _ctx: &ScriptContext<'_>, _dt: f32) -> ScriptResult {
            panic!("tick blew up")
        }
    }

    #[test]
    fn test_missing_type_name() {
        let mut host = host();
        let request = CreateRequest {
            type_name: None,
            module_path: None,
            owner: EntityAddress::default(),
        };
        let err = host.create_instance(&request).err().unwrap();
        assert!(matches!(err, BridgeError::MissingTypeName));

        let err = host
            .create_instance(&CreateRequest::new("", EntityAddress::default()))
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::MissingTypeName));
    }

    #[test]
    fn test_unknown_type() {
        let mut host = host();
        let err = host
            .create_instance(&CreateRequest::new("host::Unknown", EntityAddress::default()))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "type 'host::Unknown' not found");
        assert!(host.registry().is_empty());
    }

    #[test]
    fn test_plain_type_is_rejected() {
        register_script_type(ScriptType::plain("host::PlainData"));
        let mut host = host();
        let err = host
            .create_instance(&CreateRequest::new("host::PlainData", EntityAddress::default()))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "InvalidCast");
    }

    #[test]
    fn test_tick_passes_dt_through() {
        register_script_type(crate::script_type!(Recorder, "host::Recorder"));
        let mut host = host();
        let owner = EntityAddress::new(7, 3, 1);
        let handle = host
            .create_instance(&CreateRequest::new("host::Recorder", owner))
            .unwrap();

        let api = NativeApi::default();
        let instance = host.instance(handle).unwrap();
        assert!(invoke(&instance, Lifecycle::Tick(0.5), &api));
        assert!(invoke(&instance, Lifecycle::Tick(-2.0), &api));
        assert!(invoke(&instance, Lifecycle::Enable, &api));
        assert_eq!(*RECORDED_DT.lock().unwrap(), vec![0.5, -2.0]);

        let guard = instance.lock().unwrap();
        assert_eq!(guard.identity().owner, owner);
        assert_eq!(guard.type_name(), "host::Recorder");
    }

    #[test]
    fn test_failures_are_contained() {
        register_script_type(crate::script_type!(Faulty, "host::Faulty"));
        let mut host = host();
        let handle = host
            .create_instance(&CreateRequest::new("host::Faulty", EntityAddress::default()))
            .unwrap();

        let api = NativeApi::default();
        let instance = host.instance(handle).unwrap();
        assert!(!invoke(&instance, Lifecycle::Enable, &api));
        assert!(!invoke(&instance, Lifecycle::Tick(0.016), &api));
        // Still dispatchable after a panic.
        assert!(invoke(&instance, Lifecycle::Disable, &api));
        assert!(host.registry().contains(handle));
    }

    #[test]
    fn test_destroy_then_dispatch_is_noop() {
        let mut host = host();
        let handle = host
            .create_instance(&CreateRequest::new("DemoScript", EntityAddress::default()))
            .unwrap();
        assert!(host.destroy_instance(handle));
        assert!(!host.destroy_instance(handle));
        host.dispatch(handle, Lifecycle::Tick(0.016));
        assert!(host.instance(handle).is_none());
    }
}
