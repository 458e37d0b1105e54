//! Bayrou Meter client.
//!
//! Registers or logs a user in, casts a yes/no vote on the single question asked by the backend,
//! and follows the aggregated results, which the backend recomputes on every read.
//!
//! The library is split the way the terminal front-end uses it:
//! - [`api`] talks HTTP/JSON to the backend through an injectable [`api::Transport`];
//! - [`session`] tracks who is identified and whether they voted during this run;
//! - [`views`] holds the forms, the results view and the background results poller;
//! - [`shell`] ties them to stdin/stdout through the command table in [`commands`].

pub mod api;
pub mod commands;
pub mod config;
pub mod helpers;
pub mod runtime;
pub mod session;
pub mod shell;
pub mod support;
pub mod views;
