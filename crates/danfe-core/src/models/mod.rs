//! Data models: invoice types and pipeline configuration.

pub mod config;
pub mod invoice;
