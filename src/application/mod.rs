pub mod auth;
pub mod introspection;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;
