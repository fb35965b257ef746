mod user;

pub use user::{SessionUser, User};
