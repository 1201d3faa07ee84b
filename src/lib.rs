pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod submissions;
pub mod validation;
