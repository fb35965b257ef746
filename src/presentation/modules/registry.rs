use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::presentation::http::routing::TrackedRouter;
use crate::presentation::modules::context::ModuleDescriptor;

pub const API_PREFIX: &str = "/api";

static PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._~-]+(/[A-Za-z0-9._~-]+)*$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a module named `{0}` is already registered")]
    DuplicateName(String),
    #[error("module path `{0}` is already taken")]
    DuplicatePath(String),
    #[error("module path `{path}` overlaps `{existing}`")]
    OverlappingPath { path: String, existing: String },
    #[error("module name must not be empty")]
    InvalidName,
    #[error("invalid module path `{0}`")]
    InvalidPath(String),
}

pub struct MountedModule {
    pub name: String,
    /// Normalised path segment(s), without surrounding slashes.
    pub path: String,
    /// Absolute mount point of the module router.
    pub mount: String,
    pub router: TrackedRouter,
}

/// Modules in registration order, unique by name and by path. No path is a
/// segment prefix of another.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<MountedModule>,
    names: HashSet<String>,
    paths: HashSet<String>,
}

fn nested_in(inner: &str, outer: &str) -> bool {
    inner
        .strip_prefix(outer)
        .is_some_and(|rest| rest.starts_with('/'))
}

pub fn normalize_path(path: &str) -> Result<String, RegistryError> {
    let trimmed = path.trim().trim_matches('/');
    if PATH_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(RegistryError::InvalidPath(path.to_string()))
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and records a module. It is mounted at `mount` when given,
    /// otherwise under `/api/<path>`.
    pub fn insert(
        &mut self,
        descriptor: ModuleDescriptor,
        mount: Option<&str>,
    ) -> Result<&MountedModule, RegistryError> {
        let name = descriptor.name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        let path = normalize_path(&descriptor.path)?;
        if self.names.contains(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if self.paths.contains(&path) {
            return Err(RegistryError::DuplicatePath(path));
        }
        if let Some(existing) = self
            .modules
            .iter()
            .find(|m| nested_in(&path, &m.path) || nested_in(&m.path, &path))
        {
            return Err(RegistryError::OverlappingPath {
                path,
                existing: existing.path.clone(),
            });
        }

        let mount = match mount {
            Some(m) => format!("/{}", m.trim_matches('/')),
            None => format!("{API_PREFIX}/{path}"),
        };
        self.names.insert(name.clone());
        self.paths.insert(path.clone());
        let idx = self.modules.len();
        self.modules.push(MountedModule {
            name,
            path,
            mount,
            router: descriptor.router,
        });
        Ok(&self.modules[idx])
    }

    pub fn names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name.clone()).collect()
    }

    pub fn into_modules(self) -> Vec<MountedModule> {
        self.modules
    }
}
