//! Feature modules shipped with the core. Each exposes a factory with the
//! [`ModuleFactory`] signature.

pub mod echo;
pub mod profile;

use crate::presentation::modules::ModuleFactory;

pub fn builtin() -> Vec<(&'static str, ModuleFactory)> {
    vec![
        (profile::NAME, profile::module as ModuleFactory),
        (echo::NAME, echo::module as ModuleFactory),
    ]
}
