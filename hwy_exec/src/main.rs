//! Main highway executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and modules
//!     - Load the scenario and the highway map
//!     - Main loop:
//!         - Synthesize the telemetry tick from the scenario simulation
//!         - Path planning processing
//!         - Feed the emitted trajectory back into the simulation
//!         - Archive writing
//!
//! All processing is synchronous: one telemetry tick runs to completion
//! before the next is produced, and every tick emits a full-horizon
//! trajectory.
//!
//! # Modules
//!
//! All modules (e.g. `path_plan`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use hwy_lib::{
    data_store::DataStore,
    map::{FrenetProjector, HighwayMap},
    params::HwyExecParams,
    path_plan,
    sim::{Scenario, Sim},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("hwy_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Highway Autonomy Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: HwyExecParams =
        util::params::load("hwy_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD SCENARIO ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument giving the scenario file is required
    let scenario = if args.len() == 2 {
        Scenario::load(&args[1]).wrap_err("Failed to load the scenario")?
    } else {
        return Err(eyre!(
            "Expected a single scenario file argument, found {}",
            args.len() - 1
        ));
    };

    info!(
        "Loaded scenario lasting {} cycles with {} traffic vehicles\n",
        scenario.num_cycles,
        scenario.vehicles.len()
    );

    // ---- LOAD MAP ----

    let mut map_path = host::get_sw_root()
        .map_err(|_| eyre!("The software root environment variable (HWY_SW_ROOT) is not set"))?;
    map_path.push(&exec_params.map_file);

    let map = HighwayMap::load(&map_path).wrap_err("Could not load the highway map")?;

    info!(
        "Map loaded: {} waypoints over a {:.1} m track",
        map.num_waypoints(),
        map.track_length_m()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.path_plan
        .init(
            path_plan::InitData {
                params_file: "path_plan.toml",
                map: Box::new(map.clone()),
            },
            &session,
        )
        .wrap_err("Failed to initialise PathPlan")?;
    info!("PathPlan init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATION ----

    let mut sim = Sim::new(&scenario, map);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    for cycle in 0..scenario.num_cycles {
        ds.cycle_start();

        // Acquire this cycle's telemetry
        let tick = sim.telemetry();

        // PathPlan processing
        match ds.path_plan.proc(&tick) {
            Ok((trajectory, report)) => {
                // Feed the plan back into the simulation
                sim.apply_plan(&trajectory);

                ds.path_plan_status_rpt = report;
                ds.path_plan_output = Some(trajectory);
                ds.num_consec_plan_errors = 0;
            }
            Err(e) => {
                // The previous reference state is held and the tick skipped;
                // persistent planning failure is fatal.
                warn!("Error during PathPlan processing: {}", e);
                ds.num_consec_plan_errors += 1;

                if ds.num_consec_plan_errors > exec_params.max_consec_plan_errors {
                    return Err(eyre!(
                        "More than {} consecutive planning errors",
                        exec_params.max_consec_plan_errors
                    ));
                }
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.path_plan.write() {
            warn!("Could not write PathPlan archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        if cycle % exec_params.status_period_cycles == 0 {
            info!(
                "Cycle {:5}: lane {}, ref speed {:5.2} mph, desired {:5.2} mph",
                cycle,
                ds.path_plan_status_rpt.selected_lane,
                ds.path_plan_status_rpt.reference_speed_mph,
                ds.path_plan_status_rpt.desired_speed_mph
            );
        }

        ds.sim_time_s += sim.cycle_period_s();
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Keep the last emitted trajectory for offline inspection
    if let Some(ref trajectory) = ds.path_plan_output {
        session.save("final_trajectory.json", trajectory);
    }

    let ctrl = ds.path_plan.controller();
    info!(
        "End of execution: {} cycles covering {:.1} s of simulated driving, \
         finishing in lane {} at {:.2} mph",
        ds.num_cycles, ds.sim_time_s, ctrl.current_lane, ctrl.reference_speed_mph
    );

    Ok(())
}
