pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod output;
pub mod progress;
pub mod storage;
pub mod transform;
