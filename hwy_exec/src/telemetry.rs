//! # Telemetry types
//!
//! One [`TelemetryTick`] is delivered per control cycle and carries everything
//! the planner needs for that cycle: the ego pose and Frenet coordinates, the
//! unconsumed remainder of the previously emitted trajectory, and the sensing
//! records for all tracked nearby vehicles.
//!
//! All inputs for a cycle arrive atomically, the planner never blocks waiting
//! for individual fields.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The full telemetry input for one planning cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryTick {
    /// Ego position in world coordinates.
    pub position_m: Vector2<f64>,

    /// Ego heading, angle to the positive world X axis.
    pub heading_rad: f64,

    /// Ego speed.
    ///
    /// Units: mph
    pub speed_mph: f64,

    /// Ego along-track position.
    pub s_m: f64,

    /// Ego lateral offset from the track centreline, positive to the right of
    /// the direction of travel.
    pub d_m: f64,

    /// Along-track position of the last point of the previous path remainder.
    pub end_path_s_m: f64,

    /// Lateral offset of the last point of the previous path remainder.
    pub end_path_d_m: f64,

    /// The points of the previously emitted trajectory which the vehicle has
    /// not yet consumed, in travel order.
    pub prev_path_m: Vec<Vector2<f64>>,

    /// Sensing records for all tracked nearby vehicles.
    pub vehicles: Vec<SensedVehicle>,
}

/// A single sensing record for one tracked vehicle.
///
/// Records are ephemeral, a fresh set arrives each cycle and no identity
/// tracking is performed across cycles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensedVehicle {
    /// Unique id of the tracked vehicle within this tick.
    pub id: u32,

    /// Position in world coordinates.
    pub position_m: Vector2<f64>,

    /// World velocity components.
    ///
    /// Units: mph
    pub velocity_mph: Vector2<f64>,

    /// Along-track position.
    pub s_m: f64,

    /// Lateral offset from the track centreline.
    pub d_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemetryTick {
    /// True if every numeric field of the tick (including all path points and
    /// sensing records) is finite.
    ///
    /// A tick containing non-finite values cannot be planned against and is
    /// rejected for that cycle.
    pub fn is_finite(&self) -> bool {
        let scalars = [
            self.heading_rad,
            self.speed_mph,
            self.s_m,
            self.d_m,
            self.end_path_s_m,
            self.end_path_d_m,
        ];

        vector_finite(&self.position_m)
            && scalars.iter().all(|v| v.is_finite())
            && self.prev_path_m.iter().all(vector_finite)
            && self.vehicles.iter().all(|v| {
                vector_finite(&v.position_m)
                    && vector_finite(&v.velocity_mph)
                    && v.s_m.is_finite()
                    && v.d_m.is_finite()
            })
    }
}

impl SensedVehicle {
    /// The speed of the vehicle, the magnitude of its velocity components.
    ///
    /// Units: mph
    pub fn speed_mph(&self) -> f64 {
        self.velocity_mph.norm()
    }

    /// The along-track position of the vehicle projected forward over the
    /// given elapsed time, assuming it holds its current speed.
    pub fn projected_s_m(&self, elapsed_s: f64) -> f64 {
        self.s_m + elapsed_s * self.speed_mph()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn vector_finite(v: &Vector2<f64>) -> bool {
    v[0].is_finite() && v[1].is_finite()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vehicle_derived_quantities() {
        let vehicle = SensedVehicle {
            id: 7,
            position_m: Vector2::new(0.0, 0.0),
            velocity_mph: Vector2::new(3.0, 4.0),
            s_m: 100.0,
            d_m: 6.0,
        };

        assert!((vehicle.speed_mph() - 5.0).abs() < 1e-12);
        assert!((vehicle.projected_s_m(2.0) - 110.0).abs() < 1e-12);
    }

    #[test]
    fn test_finite_check() {
        let mut tick = TelemetryTick::default();
        assert!(tick.is_finite());

        tick.speed_mph = f64::NAN;
        assert!(!tick.is_finite());

        tick.speed_mph = 0.0;
        tick.prev_path_m.push(Vector2::new(1.0, f64::INFINITY));
        assert!(!tick.is_finite());
    }
}
