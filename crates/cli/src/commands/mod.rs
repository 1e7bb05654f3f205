//! Subcommand implementations

pub mod alerts;
pub mod baseline;
pub mod samples;
pub mod settings;
pub mod status;
