//! # homesim
//!
//! Terminal front-end for the smart-home simulator.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars, CLI flags)
//! - Parse interactive commands and dispatch them to the `Home`
//! - Render the dashboard as text or JSON
//!
//! ## Dependency rule
//! This is the **only** crate that touches the terminal, the filesystem or
//! the environment. No domain logic belongs here.

pub mod command;
pub mod config;
pub mod dashboard;
pub mod shell;
