//! # Highway autonomy library.
//!
//! This library allows other crates in the workspace, the executable, the
//! tests and the benchmarks to access the items defined inside the highway
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - global per-cycle data for the executable
pub mod data_store;

/// Map module - the static highway waypoint table and Frenet projection
pub mod map;

/// Executable parameters
pub mod params;

/// Path planning module - lane selection, speed governing and trajectory generation
pub mod path_plan;

/// Scenario simulation - closed loop stand-in for the live telemetry transport
pub mod sim;

/// Spline module - smooth curve fitting through ordered anchor points
pub mod spline;

/// Telemetry types - the per-tick input delivered by the transport
pub mod telemetry;
