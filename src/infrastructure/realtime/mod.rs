mod namespaces;

pub use namespaces::{Namespace, NamespaceEvent, NamespaceRegistry, normalize_namespace};
