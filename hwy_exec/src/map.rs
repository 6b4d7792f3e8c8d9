//! # Map module
//!
//! The static highway map is a table of waypoints along the track centreline
//! of a closed loop. Each waypoint carries its world position, its along-track
//! position `s`, and the unit normal pointing to the right of the direction of
//! travel (the direction in which the lateral offset `d` increases).
//!
//! The module provides the Frenet projection capability consumed by the
//! planner: mapping an `(s, d)` pair to world coordinates. Along-track
//! positions wrap modulo the total track length, the track is a closed loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;
use std::path::Path;

// Internal
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The Frenet projection capability.
///
/// Implementors map along-track/lateral-offset coordinates into world
/// coordinates for a closed-loop track.
pub trait FrenetProjector {
    /// Total length of the closed-loop track.
    fn track_length_m(&self) -> f64;

    /// Map the given `(s, d)` Frenet coordinates to world coordinates.
    ///
    /// `s` is wrapped modulo the track length before projection.
    fn xy_from_frenet(&self, s_m: f64, d_m: f64) -> Vector2<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single centreline waypoint.
#[derive(Debug, Clone, Copy)]
pub struct Waypoint {
    /// World position of the waypoint.
    pub position_m: Vector2<f64>,

    /// Along-track position of the waypoint.
    pub s_m: f64,

    /// Unit normal pointing to the right of the direction of travel.
    pub normal: Vector2<f64>,
}

/// The highway waypoint map.
#[derive(Debug, Clone)]
pub struct HighwayMap {
    waypoints: Vec<Waypoint>,
    length_m: f64,
}

/// One row of the on-disk waypoint table.
#[derive(Debug, Deserialize)]
struct WaypointRow(f64, f64, f64, f64, f64);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors produced when loading a map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Cannot read the waypoint table: {0}")]
    ReadError(#[from] csv::Error),

    #[error("Expected at least 2 waypoints, found {0}")]
    TooFewWaypoints(usize),

    #[error("The first waypoint must be at s = 0, found {0}")]
    StartNotZero(f64),

    #[error("Waypoint s values are not strictly increasing at row {0}")]
    NonMonotonicS(usize),

    #[error("Waypoint table contains a non-finite value at row {0}")]
    NonFiniteValue(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HighwayMap {
    /// Load a waypoint map from a whitespace-delimited CSV file.
    ///
    /// Each row is `x y s normal_x normal_y`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_path(path)?;

        let mut waypoints = Vec::new();

        for record in reader.deserialize() {
            let row: WaypointRow = record?;
            waypoints.push(Waypoint {
                position_m: Vector2::new(row.0, row.1),
                s_m: row.2,
                normal: Vector2::new(row.3, row.4),
            });
        }

        Self::from_waypoints(waypoints)
    }

    /// Build a map from an in-memory waypoint table.
    ///
    /// The table must contain at least two waypoints with strictly increasing
    /// `s` starting at zero. The track length is the `s` of the last waypoint
    /// plus the length of the closing segment back to the first.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Result<Self, MapError> {
        if waypoints.len() < 2 {
            return Err(MapError::TooFewWaypoints(waypoints.len()));
        }

        for (i, wp) in waypoints.iter().enumerate() {
            let finite = wp.position_m[0].is_finite()
                && wp.position_m[1].is_finite()
                && wp.s_m.is_finite()
                && wp.normal[0].is_finite()
                && wp.normal[1].is_finite();
            if !finite {
                return Err(MapError::NonFiniteValue(i));
            }
        }

        if waypoints[0].s_m != 0.0 {
            return Err(MapError::StartNotZero(waypoints[0].s_m));
        }

        for i in 1..waypoints.len() {
            if waypoints[i].s_m <= waypoints[i - 1].s_m {
                return Err(MapError::NonMonotonicS(i));
            }
        }

        // Close the loop back to the first waypoint
        let last = &waypoints[waypoints.len() - 1];
        let closing_m = (waypoints[0].position_m - last.position_m).norm();
        let length_m = last.s_m + closing_m;

        Ok(HighwayMap {
            waypoints,
            length_m,
        })
    }

    /// Number of waypoints in the table.
    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }
}

impl FrenetProjector for HighwayMap {
    fn track_length_m(&self) -> f64 {
        self.length_m
    }

    fn xy_from_frenet(&self, s_m: f64, d_m: f64) -> Vector2<f64> {
        let s = rem_euclid(s_m, self.length_m);

        // Last waypoint at or before s. The first waypoint is at s = 0 so the
        // subtraction cannot underflow.
        let i = self.waypoints.partition_point(|w| w.s_m <= s) - 1;

        let wp = &self.waypoints[i];
        let (next, segment_m) = if i == self.waypoints.len() - 1 {
            // Closing segment wraps back to the start of the loop
            (&self.waypoints[0], self.length_m - wp.s_m)
        } else {
            (&self.waypoints[i + 1], self.waypoints[i + 1].s_m - wp.s_m)
        };

        let frac = (s - wp.s_m) / segment_m;

        let position = wp.position_m + (next.position_m - wp.position_m) * frac;
        let normal = (wp.normal + (next.normal - wp.normal) * frac)
            .try_normalize(1e-9)
            .unwrap_or(wp.normal);

        position + normal * d_m
    }
}

// ---------------------------------------------------------------------------
// TEST UTILITIES
// ---------------------------------------------------------------------------

/// A trivial projection over a straight track running along the world X axis,
/// with `d` increasing towards negative Y.
#[cfg(test)]
pub(crate) struct StraightTrack {
    pub length_m: f64,
}

#[cfg(test)]
impl FrenetProjector for StraightTrack {
    fn track_length_m(&self) -> f64 {
        self.length_m
    }

    fn xy_from_frenet(&self, s_m: f64, d_m: f64) -> Vector2<f64> {
        Vector2::new(s_m, -d_m)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
