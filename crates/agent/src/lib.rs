//! Wellness agent: hosts one monitoring session behind an HTTP API

pub mod api;
pub mod config;
