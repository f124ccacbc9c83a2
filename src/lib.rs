//! Chefer: a restaurant site with a filterable menu, content pages and
//! visitor intake.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
