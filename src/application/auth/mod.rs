pub mod authenticator;
pub mod bridge;
pub mod hooks;

pub use authenticator::{AuthError, Authenticator, NewAccount, Session, TokenSettings};
pub use bridge::AuthBridge;
pub use hooks::{AuthHooks, HookFailure, HookResult, Interception, Registration};
