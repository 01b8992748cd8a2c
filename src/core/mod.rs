pub mod app;
pub mod backend;
pub mod config;
pub mod invoker;
pub mod message;
pub mod process;
pub mod session;
pub mod status;
pub mod store;
