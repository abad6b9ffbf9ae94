pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod odds;
pub mod state;
pub mod types;
