//! Data models for snapcap.

pub mod config;
pub mod prediction;
