//! # homesim-app
//!
//! Application layer — the stateful use-cases of the simulator.
//!
//! ## Responsibilities
//! - `DeviceRegistry` — register, look up, filter and control devices
//! - `OccupancyTracker` — per-room presence with a whole-home aggregate
//! - `RuleEngine` — register, enable/disable and execute contextual rules,
//!   keeping a bounded execution history
//! - `Home` — the context object bundling the three above, plus default
//!   data, suggestions and the status snapshot
//!
//! ## Dependency rule
//! Depends on `homesim-domain` only (plus `tracing`). Never reads the
//! terminal, the filesystem or the environment; the binary does that.

pub mod defaults;
pub mod home;
pub mod occupancy;
pub mod registry;
pub mod rule_engine;
