pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod store;
pub mod sync;
