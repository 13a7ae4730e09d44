//! # homesim-domain
//!
//! Pure domain model for the homesim smart-home simulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, time-of-day helpers
//! - Define **Devices** (lights, thermostats, cameras, locks, motion sensors) and
//!   their category-specific, validated properties
//! - Define **Occupancy** (per-room presence flags)
//! - Define **Rules** (condition tree → ordered device actions)
//! - Define **Execution reports** and **Suggestions**
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO. Time is
//! always passed in by the caller.

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod occupancy;
pub mod report;
pub mod rule;
pub mod suggestion;
