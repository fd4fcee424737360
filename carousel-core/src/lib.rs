pub mod cache;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod events;
pub mod ipc;
pub mod models;
pub mod paths;
