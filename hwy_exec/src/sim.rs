//! # Scenario simulation
//!
//! A closed-loop stand-in for the live telemetry transport. A [`Scenario`]
//! describes the starting state of the ego and a set of constant-speed
//! traffic vehicles; [`Sim`] synthesizes one [`TelemetryTick`] per cycle,
//! consumes the leading points of each trajectory the planner emits, and
//! moves the ego and traffic forward accordingly.
//!
//! This keeps the executable runnable and the planner exercised end-to-end
//! without any network transport: the planner sees exactly the same tick
//! structure a live feed would deliver, including the unconsumed remainder of
//! its own previous output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;
use std::path::Path;

// Internal
use crate::map::{FrenetProjector, HighwayMap};
use crate::path_plan::{Trajectory, TRAJ_DT_S};
use crate::telemetry::{SensedVehicle, TelemetryTick};
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// One mph expressed in metres per second.
const MPS_PER_MPH: f64 = 0.44704;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A scenario definition, loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Number of cycles to run.
    pub num_cycles: u64,

    /// How many trajectory points the vehicle consumes between ticks.
    pub points_consumed_per_cycle: usize,

    /// Starting Frenet state of the ego.
    pub ego: EgoStart,

    /// Constant-speed traffic vehicles.
    pub vehicles: Vec<TrafficVehicle>,
}

/// Starting state of the ego vehicle. The ego always starts at rest.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EgoStart {
    pub s_m: f64,
    pub d_m: f64,
}

/// A traffic vehicle holding its lane at constant speed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrafficVehicle {
    pub id: u32,
    pub d_m: f64,
    pub s_m: f64,
    pub speed_mph: f64,
}

/// The closed-loop simulation state.
pub struct Sim {
    map: HighwayMap,
    points_consumed_per_cycle: usize,

    // Ego state
    ego_position_m: Vector2<f64>,
    ego_heading_rad: f64,
    ego_speed_mph: f64,
    ego_s_m: f64,
    ego_d_m: f64,

    // Previous plan feedback
    path_m: Vec<Vector2<f64>>,
    path_end_s_m: f64,

    vehicles: Vec<TrafficVehicle>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors produced when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Cannot load the scenario file: {0}")]
    FileLoadError(#[from] std::io::Error),

    #[error("Cannot parse the scenario file: {0}")]
    ParseError(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;

        Ok(serde_json::from_str(&text)?)
    }
}

impl Sim {
    /// Build the simulation from a scenario and the highway map.
    pub fn new(scenario: &Scenario, map: HighwayMap) -> Self {
        let ego_position_m = map.xy_from_frenet(scenario.ego.s_m, scenario.ego.d_m);

        // Heading from the local track tangent
        let ahead_m = map.xy_from_frenet(scenario.ego.s_m + 1.0, scenario.ego.d_m);
        let tangent = ahead_m - ego_position_m;
        let ego_heading_rad = tangent[1].atan2(tangent[0]);

        Sim {
            map,
            points_consumed_per_cycle: scenario.points_consumed_per_cycle.max(1),
            ego_position_m,
            ego_heading_rad,
            ego_speed_mph: 0.0,
            ego_s_m: scenario.ego.s_m,
            ego_d_m: scenario.ego.d_m,
            path_m: Vec::new(),
            path_end_s_m: scenario.ego.s_m,
            vehicles: scenario.vehicles.clone(),
        }
    }

    /// The simulated time covered by one cycle.
    pub fn cycle_period_s(&self) -> f64 {
        self.points_consumed_per_cycle as f64 * TRAJ_DT_S
    }

    /// Synthesize the telemetry tick for the current cycle.
    pub fn telemetry(&self) -> TelemetryTick {
        let vehicles = self
            .vehicles
            .iter()
            .map(|v| {
                let position_m = self.map.xy_from_frenet(v.s_m, v.d_m);

                // Velocity along the local track tangent
                let ahead_m = self.map.xy_from_frenet(v.s_m + 1.0, v.d_m);
                let direction = (ahead_m - position_m).normalize();

                SensedVehicle {
                    id: v.id,
                    position_m,
                    velocity_mph: direction * v.speed_mph,
                    s_m: v.s_m,
                    d_m: v.d_m,
                }
            })
            .collect();

        TelemetryTick {
            position_m: self.ego_position_m,
            heading_rad: self.ego_heading_rad,
            speed_mph: self.ego_speed_mph,
            s_m: self.ego_s_m,
            d_m: self.ego_d_m,
            end_path_s_m: self.path_end_s_m,
            end_path_d_m: self.ego_d_m,
            prev_path_m: self.path_m.clone(),
            vehicles,
        }
    }

    /// Apply a freshly planned trajectory and advance the world by one cycle.
    pub fn apply_plan(&mut self, trajectory: &Trajectory) {
        let track_length_m = self.map.track_length_m();

        // Advance the end-of-path position by the arc length of the newly
        // appended points.
        let mut tail_m = match self.path_m.last() {
            Some(&p) => p,
            None => self.ego_position_m,
        };
        for &point_m in &trajectory.points_m[self.path_m.len().min(trajectory.points_m.len())..] {
            self.path_end_s_m += (point_m - tail_m).norm();
            tail_m = point_m;
        }
        self.path_end_s_m = rem_euclid(self.path_end_s_m, track_length_m);

        self.path_m = trajectory.points_m.clone();

        // Consume the leading points, walking the ego along them.
        let consumed = self.points_consumed_per_cycle.min(self.path_m.len());
        let mut travelled_m = 0.0;
        let mut position_m = self.ego_position_m;

        for &point_m in self.path_m.iter().take(consumed) {
            travelled_m += (point_m - position_m).norm();
            position_m = point_m;
        }

        if consumed > 0 {
            let from_m = if consumed > 1 {
                self.path_m[consumed - 2]
            } else {
                self.ego_position_m
            };
            let step_m = position_m - from_m;
            if step_m.norm() > 1e-9 {
                self.ego_heading_rad = step_m[1].atan2(step_m[0]);
            }

            self.ego_position_m = position_m;
            self.ego_s_m = rem_euclid(self.ego_s_m + travelled_m, track_length_m);
            self.ego_speed_mph = travelled_m / self.cycle_period_s() / MPS_PER_MPH;
            self.path_m.drain(..consumed);
        }

        // Constant-velocity traffic
        let elapsed_s = self.cycle_period_s();
        for vehicle in &mut self.vehicles {
            vehicle.s_m = rem_euclid(
                vehicle.s_m + vehicle.speed_mph * MPS_PER_MPH * elapsed_s,
                track_length_m,
            );
        }

        self.sanity_check();
    }

    /// The vehicle must never be left without feedback state.
    fn sanity_check(&self) {
        debug_assert!(self.ego_s_m.is_finite());
        debug_assert!(self.path_end_s_m.is_finite());
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::Waypoint;

    /// A long straight test track (closed by a degenerate seam well away from
    /// the action).
    fn test_map() -> HighwayMap {
        let waypoints = (0..200)
            .map(|i| Waypoint {
                position_m: Vector2::new(i as f64 * 10.0, 0.0),
                s_m: i as f64 * 10.0,
                normal: Vector2::new(0.0, -1.0),
            })
            .collect();

        HighwayMap::from_waypoints(waypoints).unwrap()
    }

    fn test_scenario() -> Scenario {
        Scenario {
            num_cycles: 10,
            points_consumed_per_cycle: 3,
            ego: EgoStart { s_m: 50.0, d_m: 6.0 },
            vehicles: vec![TrafficVehicle {
                id: 1,
                d_m: 6.0,
                s_m: 100.0,
                speed_mph: 30.0,
            }],
        }
    }

    #[test]
    fn test_initial_tick() {
        let sim = Sim::new(&test_scenario(), test_map());
        let tick = sim.telemetry();

        assert_eq!(tick.prev_path_m.len(), 0);
        assert_eq!(tick.speed_mph, 0.0);
        assert!((tick.s_m - 50.0).abs() < 1e-9);
        assert!((tick.end_path_s_m - 50.0).abs() < 1e-9);
        assert_eq!(tick.vehicles.len(), 1);
        assert!((tick.vehicles[0].speed_mph() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_consumption_moves_the_ego() {
        let mut sim = Sim::new(&test_scenario(), test_map());

        // A plan running straight down the lane at 0.25 m spacing
        let trajectory = Trajectory {
            points_m: (1..=50)
                .map(|i| Vector2::new(50.0 + i as f64 * 0.25, -6.0))
                .collect(),
        };

        sim.apply_plan(&trajectory);
        let tick = sim.telemetry();

        // Three points consumed: 0.75 m travelled, 47 remaining
        assert_eq!(tick.prev_path_m.len(), 47);
        assert!((tick.s_m - 50.75).abs() < 1e-9);
        assert!((tick.position_m[0] - 50.75).abs() < 1e-9);
        assert!(tick.speed_mph > 0.0);

        // End of path is 50 points * 0.25 m ahead of the start
        assert!((tick.end_path_s_m - 62.5).abs() < 1e-9);

        // Traffic advanced by its constant speed
        assert!(tick.vehicles[0].s_m > 100.0);
    }
}
