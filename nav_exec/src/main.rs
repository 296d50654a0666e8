//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The executable runs the pathfinding engine and path follower against the simulated world:
//!
//!     - Initialise the session, logger, parameters, world and modules
//!     - Main loop, once per follower cycle:
//!         - World step
//!         - Whenever the planner timer fires:
//!             - Reload the navigation parameters if the file has changed
//!             - Rebuild the grid if the lattice density changed
//!             - Planning cycle
//!         - Path follower processing and archiving
//!         - Agent body motion
//!     - Exit on arrival or once the run duration has elapsed

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn, LevelFilter};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use nav_lib::{
    follow::{InputData, PathFollower},
    nav::{PathfindingEngine, PeriodicTimer, PlanInput},
    params::NavParams,
    sim::{AgentBody, SimParams, SimWorld},
    visual::AsciiVisualiser,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, parse_level_override},
    module::State,
    params::ParamsWatcher,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets logged below the main log level unless overridden on the command line. The planner
/// logs every cell it touches at trace.
const DEFAULT_LEVEL_OVERRIDES: &[(&str, LevelFilter)] =
    &[("nav_lib::nav::astar", LevelFilter::Debug)];

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Grid pathfinder executable.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opt {
    /// Navigation parameter file, relative to the params directory.
    #[structopt(long, default_value = "nav_exec.toml")]
    nav_params: String,

    /// Simulated world parameter file, relative to the params directory.
    #[structopt(long, default_value = "sim.toml")]
    sim_params: String,

    /// Pace the main loop in real time rather than running as fast as possible.
    #[structopt(long)]
    realtime: bool,

    /// Override the run duration from the world parameters, in seconds.
    #[structopt(long)]
    duration_s: Option<f64>,

    /// Log a character map of the grid after each planning cycle.
    #[structopt(long)]
    render: bool,

    /// Main log level, one of `info`, `debug` or `trace`.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Per-target log level, as `target=level`. May be given more than once.
    #[structopt(long = "log-target", parse(try_from_str = parse_level_override))]
    log_targets: Vec<(String, LevelFilter)>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, command line overrides take precedence over the defaults
    let mut level_overrides: Vec<(String, LevelFilter)> = DEFAULT_LEVEL_OVERRIDES
        .iter()
        .filter(|(t, _)| !opt.log_targets.iter().any(|(o, _)| o == t))
        .map(|(t, l)| (t.to_string(), *l))
        .collect();
    level_overrides.extend(opt.log_targets.iter().cloned());

    logger_init(opt.log_level, &level_overrides, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Grid Pathfinder Executable\n");
    info!(
        "Software root: {:?}",
        host::get_sw_root().wrap_err("Software root is not set")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let nav_params: NavParams = util::params::load(&opt.nav_params)
        .wrap_err("Could not load navigation parameters")?;
    nav_params
        .validate()
        .wrap_err("Invalid navigation parameters")?;

    let mut nav_params_watcher =
        ParamsWatcher::new(&opt.nav_params).wrap_err("Could not watch navigation parameters")?;

    let mut sim_params: SimParams =
        util::params::load(&opt.sim_params).wrap_err("Could not load world parameters")?;
    if let Some(d) = opt.duration_s {
        sim_params.duration_s = d;
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE WORLD ----

    let mut world = SimWorld::new(&sim_params).wrap_err("Could not create the world")?;
    let mut body = AgentBody::new(sim_params.agent_start_m, sim_params.agent_heading_rad);

    // ---- INITIALISE MODULES ----

    let mut follower = PathFollower::default();
    follower
        .init(nav_params.follower.clone(), &session)
        .wrap_err("Failed to initialise the path follower")?;
    info!("PathFollower init complete");

    let mut engine = PathfindingEngine::new(
        nav_params.grid.clone(),
        nav_params.planner.clone(),
        nav_params.visualisation,
        AsciiVisualiser::new(),
    );
    let path_receiver = engine.subscribe_channel();

    let plan_input = |body: &AgentBody| PlanInput {
        agent_m: body.pose().position_m,
        destination_m: sim_params.destination_m,
    };

    engine
        .initialise(&plan_input(&body))
        .wrap_err("Failed to build the navigation grid")?;
    info!("PathfindingEngine init complete");

    let mut plan_timer = PeriodicTimer::new(
        nav_params.planner.start_delay_s,
        nav_params.planner.refresh_period_s,
    );

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let cycle_period_s = nav_params.follower.tick_period_s;
    let mut density = nav_params.grid.density;
    let mut sim_time_s = 0.0;
    let mut num_cycles: u64 = 0;
    let mut arrived = false;

    info!("Begining main loop\n");

    while sim_time_s < sim_params.duration_s {
        let cycle_start_instant = Instant::now();

        // ---- WORLD ----

        world.step(cycle_period_s);
        sim_time_s += cycle_period_s;

        // ---- PLANNING ----

        let input = plan_input(&body);

        if plan_timer.tick(cycle_period_s) {
            match nav_params_watcher.poll::<NavParams>() {
                Ok(Some(p)) => match p.validate() {
                    Ok(()) => {
                        info!(
                            "Navigation parameters changed, density {}, refresh period {} s",
                            p.grid.density, p.planner.refresh_period_s
                        );
                        density = p.grid.density;
                        plan_timer.set_period(p.planner.refresh_period_s);
                    }
                    Err(e) => warn!("Ignoring changed navigation parameters: {}", e),
                },
                Ok(None) => (),
                Err(e) => warn!("Could not reload navigation parameters: {}", e),
            }

            if let Err(e) = engine.rebuild_if_density_changed(density, &input) {
                warn!("Could not rebuild the navigation grid: {}", e);
            }

            match engine.refresh_and_plan(&input, &world) {
                Ok(outcome) => {
                    if outcome.path.is_none() {
                        debug!("No path this cycle");
                    }
                    if opt.render {
                        debug!("Grid:\n{}", engine.visualiser().render());
                    }
                }
                Err(e) => warn!("Planning cycle failed: {}", e),
            }
        }

        // ---- PATH FOLLOWING ----

        let follower_input = InputData {
            pose: *body.pose(),
            dt_s: cycle_period_s,
            new_path: path_receiver.latest(),
        };

        match follower.proc(&follower_input) {
            Ok((demand, report)) => {
                if let Some(d) = demand {
                    body.apply(&d);
                }

                if report.arrived {
                    arrived = true;
                }
            }
            Err(e) => warn!("PathFollower processing error: {}", e),
        }

        if let Err(e) = follower.write() {
            warn!("Could not write PathFollower archive: {}", e);
        }

        num_cycles += 1;

        if arrived {
            info!("Destination reached at {:.02} s", sim_time_s);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if opt.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                ),
            }
        }
    }

    // ---- SHUTDOWN ----

    if !arrived {
        warn!(
            "Run duration of {:.02} s elapsed before reaching the destination",
            sim_params.duration_s
        );
    }

    info!(
        "{} cycles, {} planning cycles, {:.02} m travelled, final position {:?}",
        num_cycles,
        engine.num_cycles(),
        body.distance_travelled_m(),
        body.pose().position_m
    );

    info!("End of execution");

    session.exit();

    Ok(())
}
