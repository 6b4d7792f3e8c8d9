//! Implementations for the PathPlan state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::cost::{self, CostCtx};
use super::lane::select_lane;
use super::speed_ctrl;
use super::traj_gen::{self, Trajectory};
use super::{Params, PathPlanError, INITIAL_LANE, NUM_LANES, TRAJ_DT_S, TRAJ_HORIZON};
use crate::map::FrenetProjector;
use crate::telemetry::TelemetryTick;
use util::{
    archive::{Archived, Archiver},
    maths::{loop_distance, rem_euclid},
    module::State,
    params,
    session::{get_elapsed_seconds, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Path planning module state
#[derive(Default)]
pub struct PathPlan {
    params: Params,

    /// The Frenet projection capability over the static highway map.
    map: Option<Box<dyn FrenetProjector + Send>>,

    /// The persistent controller state, the only data surviving across ticks.
    ctrl: ControllerState,

    report: StatusReport,
    arch_report: Archiver,
}

/// Initialisation data for PathPlan.
pub struct InitData {
    /// Name of the parameter file within the params directory.
    pub params_file: &'static str,

    /// The Frenet projection capability to plan against.
    pub map: Box<dyn FrenetProjector + Send>,
}

/// The persistent controller state.
///
/// Owned exclusively by the planning module and mutated by a single writer,
/// one tick at a time. Lost on restart: the vehicle re-initialises to the
/// default lane at zero speed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ControllerState {
    /// The lane the controller currently occupies or is moving into.
    pub current_lane: usize,

    /// The ramped reference speed the trajectory realises.
    ///
    /// Units: mph
    pub reference_speed_mph: f64,

    /// Along-track position of the end of the lane change lockout window.
    /// While the lockout point lies within the lockout distance ahead of the
    /// ego (measured around the loop), no new lane change may be committed.
    pub lockout_s_m: f64,
}

/// Status report for PathPlan processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// The cost assigned to each lane this tick.
    pub lane_costs: [f64; NUM_LANES],

    /// The lane selected this tick.
    pub selected_lane: usize,

    /// True if a lane change was committed this tick.
    pub lane_changed: bool,

    /// True if the lane change lockout was active this tick.
    pub lockout_active: bool,

    /// The speed the governor targeted this tick.
    ///
    /// Units: mph
    pub desired_speed_mph: f64,

    /// The reference speed after this tick's ramp step.
    ///
    /// Units: mph
    pub reference_speed_mph: f64,

    /// Number of freshly generated points appended behind the carry-over.
    pub num_new_points: usize,
}

/// A flattened per-tick archive row.
#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    lane0_cost: f64,
    lane1_cost: f64,
    lane2_cost: f64,
    selected_lane: usize,
    lane_changed: bool,
    desired_speed_mph: f64,
    reference_speed_mph: f64,
    num_new_points: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState {
            current_lane: INITIAL_LANE,
            reference_speed_mph: 0.0,
            lockout_s_m: 0.0,
        }
    }
}

impl State for PathPlan {
    type InitData = InitData;
    type InitError = PathPlanError;

    type InputData = TelemetryTick;
    type OutputData = Trajectory;
    type StatusReport = StatusReport;
    type ProcError = PathPlanError;

    /// Initialise the PathPlan module.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), PathPlanError> {
        // Load the parameters
        self.params = params::load(init_data.params_file).map_err(PathPlanError::ParamLoadError)?;

        self.map = Some(init_data.map);

        // Create the arch folder for path_plan
        let mut arch_path = session.arch_root.clone();
        arch_path.push("path_plan");
        std::fs::create_dir_all(arch_path).map_err(|e| PathPlanError::ArchInitError(e.to_string()))?;

        self.arch_report = Archiver::from_path(session, "path_plan/status_report.csv")
            .map_err(|e| PathPlanError::ArchInitError(e.to_string()))?;

        Ok(())
    }

    /// Perform cyclic processing of path planning.
    ///
    /// Processing involves:
    ///  1. Selecting the lane to occupy via the cost model, gated by the
    ///     lane change lockout.
    ///  2. Governing the reference speed for the selected lane.
    ///  3. Generating the output trajectory behind the carry-over of the
    ///     previous path remainder.
    fn proc(&mut self, tick: &TelemetryTick) -> Result<(Trajectory, StatusReport), PathPlanError> {
        // Clear the status report
        self.report = StatusReport::default();

        if !tick.is_finite() {
            return Err(PathPlanError::MalformedTelemetry);
        }

        let map = self.map.as_ref().ok_or(PathPlanError::NoMap)?;

        // Plan from the end of the unconsumed remainder so that the horizon
        // stays continuous rather than re-planning from the instantaneous
        // (noisy) position.
        let plan_s_m = if tick.prev_path_m.is_empty() {
            tick.s_m
        } else {
            tick.end_path_s_m
        };

        // Time already covered by the remainder, used to project the sensing
        // records to the point where new planning starts.
        let elapsed_s = tick.prev_path_m.len() as f64 * TRAJ_DT_S;

        // ---- LANE SELECTION ----

        let ctx = CostCtx {
            ego_s_m: plan_s_m,
            ego_lane: self.ctrl.current_lane,
            ego_speed_mph: tick.speed_mph,
            elapsed_s,
            vehicles: &tick.vehicles,
            params: &self.params,
        };

        let costs = cost::lane_costs(&ctx);
        let new_lane = select_lane(&costs, self.ctrl.current_lane);

        let track_length_m = map.track_length_m();
        let locked_out = loop_distance(plan_s_m, self.ctrl.lockout_s_m, track_length_m)
            <= self.params.lane_change_lockout_m;

        if new_lane != self.ctrl.current_lane && !locked_out {
            debug!(
                "Lane change committed: {} -> {} (costs {:?})",
                self.ctrl.current_lane, new_lane, costs
            );

            // Advance the lockout to the point one lockout distance ahead of
            // where the change was committed.
            self.ctrl.lockout_s_m = rem_euclid(
                plan_s_m + self.params.lane_change_lockout_m,
                track_length_m,
            );
            self.ctrl.current_lane = new_lane;
            self.report.lane_changed = true;
        }

        self.report.lane_costs = costs;
        self.report.selected_lane = self.ctrl.current_lane;
        self.report.lockout_active = locked_out;

        // ---- SPEED GOVERNING ----

        let desired_mph = speed_ctrl::desired_speed_mph(
            plan_s_m,
            self.ctrl.current_lane,
            elapsed_s,
            &tick.vehicles,
            &self.params,
        );

        self.ctrl.reference_speed_mph = speed_ctrl::ramp_reference_mph(
            self.ctrl.reference_speed_mph,
            desired_mph,
            self.params.speed_step_mph,
        );

        self.report.desired_speed_mph = desired_mph;
        self.report.reference_speed_mph = self.ctrl.reference_speed_mph;

        // ---- TRAJECTORY GENERATION ----

        let trajectory = traj_gen::generate(tick, &self.ctrl, plan_s_m, map.as_ref(), &self.params)?;

        self.report.num_new_points =
            trajectory.points_m.len() - tick.prev_path_m.len().min(TRAJ_HORIZON);

        trace!(
            "PathPlan output: lane {}, ref {:.3} mph, {} new points",
            self.ctrl.current_lane,
            self.ctrl.reference_speed_mph,
            self.report.num_new_points
        );

        Ok((trajectory, self.report))
    }
}

impl Archived for PathPlan {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(ReportRecord {
            time_s: get_elapsed_seconds(),
            lane0_cost: self.report.lane_costs[0],
            lane1_cost: self.report.lane_costs[1],
            lane2_cost: self.report.lane_costs[2],
            selected_lane: self.report.selected_lane,
            lane_changed: self.report.lane_changed,
            desired_speed_mph: self.report.desired_speed_mph,
            reference_speed_mph: self.report.reference_speed_mph,
            num_new_points: self.report.num_new_points,
        })?;

        Ok(())
    }
}

impl PathPlan {
    /// Build a planner directly from parameters and a map capability, without
    /// a session or parameter file.
    pub fn new(params: Params, map: Box<dyn FrenetProjector + Send>) -> Self {
        PathPlan {
            params,
            map: Some(map),
            ctrl: ControllerState::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// The module parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The persistent controller state.
    pub fn controller(&self) -> &ControllerState {
        &self.ctrl
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
