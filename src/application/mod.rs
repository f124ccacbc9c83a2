//! Application services layer.

pub mod chrome;
pub mod content;
pub mod error;
pub mod import;
pub mod intake;
pub mod mail;
pub mod menu;
pub mod pagination;
pub mod repos;
