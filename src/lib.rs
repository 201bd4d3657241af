pub mod actions;
pub mod audit;
pub mod client;
pub mod commands;
pub mod config;
pub mod records;
pub mod snapshot;
