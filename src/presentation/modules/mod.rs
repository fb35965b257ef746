mod context;
mod registry;

pub use context::{ModuleContext, ModuleDescriptor, ModuleFactory};
pub use registry::{API_PREFIX, ModuleRegistry, MountedModule, RegistryError, normalize_path};
