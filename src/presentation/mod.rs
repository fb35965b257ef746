pub mod http;
pub mod modules;
pub mod ws;
