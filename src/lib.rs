//! Switchboard is a terminal chat front-end that routes a single conversation
//! to interchangeable text-generation backends.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the transcript, backend selection, routing, persistence,
//!   and the local runtime checks.
//! - [`api`] defines the request/response payloads for the local runtime and
//!   the cloud deployment.
//! - [`commands`] implements slash-command parsing for the chat loop.
//! - [`ui`] runs the interactive line-based chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
