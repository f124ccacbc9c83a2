//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod db;
pub mod error;
pub mod http;
pub mod mail;
pub mod telemetry;
