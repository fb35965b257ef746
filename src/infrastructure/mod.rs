pub mod db;
pub mod kv;
pub mod realtime;
