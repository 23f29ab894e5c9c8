//! Event management core: configurable projects with landing pages, dynamic
//! registration forms, admission policy, and registration intake.

pub mod config;
pub mod error;
pub mod export;
pub mod projects;
pub mod storage;
pub mod telemetry;
