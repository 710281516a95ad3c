// Utility functions module
pub mod cleanup;
pub mod config;
pub mod formatters;
