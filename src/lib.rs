pub mod config;
pub mod error;
pub mod http;
pub mod patch;
pub mod service;
pub mod sled_store;
pub mod store;
pub mod ticket;
pub mod transition;
pub mod utils;
