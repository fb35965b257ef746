pub mod admin;
pub mod auth;
pub mod health;
pub mod openapi;
pub mod response;
pub mod routing;
