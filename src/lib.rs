pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod presets;
pub mod prompt;
pub mod provider;
pub mod storage;
pub mod web;
