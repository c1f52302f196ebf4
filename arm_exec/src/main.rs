//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The executable runs the motion sequence once on the simulated equipment:
//!
//!     - Initialise the session and logging
//!     - Load all parameter files
//!     - Build the simulation, arm driver, behaviours and sequencer
//!     - Run the sequence from calibration to completion
//!     - Save the sequence report into the session directory
//!
//! A sequence abort results in a non-zero exit status.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::info;
use structopt::StructOpt;

// Internal
use arm_lib::{params::ArmExecParams, sim::Sim};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Run the two-link arm motion sequence")]
struct Opts {
    /// Minimum level of log messages, must be at least "info"
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,

    /// Don't archive the sweep records
    #[structopt(long)]
    no_archive: bool,

    /// Run the simulation at wall clock speed
    #[structopt(long)]
    real_time: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Two-Link Arm Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params = ArmExecParams::load().wrap_err("Could not load parameters")?;

    info!(
        "Arm geometry: L1 = {}, L2 = {}, {:?} elbow",
        params.kinematics.l1, params.kinematics.l2, params.kinematics.elbow_config
    );

    // ---- INITIALISE MODULES ----

    let sim = Sim::new(params.sim.clone()).wrap_err("Failed to initialise the simulation")?;

    let mut seq = sim
        .motion_seq(&params, opts.real_time)
        .wrap_err("Failed to initialise the motion sequencer")?;

    if !opts.no_archive {
        seq = seq.with_archiver(
            Archiver::from_path(&session, "sweep.csv")
                .wrap_err("Failed to create the sweep archive")?,
        );
    }

    info!("Initialisation complete\n");

    // ---- RUN ----

    let result = seq.run();

    info!("Simulated time: {:.2} s", sim.time_s());

    match result {
        Ok(report) => {
            info!(
                "{} phases completed, {} of {} sweep steps reachable",
                report.completed_phases.len(),
                report.sweep.iter().filter(|r| r.reachable).count(),
                report.sweep.len()
            );

            session.save("seq_report.json", report);
            session.exit();

            Ok(())
        }
        Err(e) => {
            session.exit();
            Err(e).wrap_err("Motion sequence aborted")
        }
    }
}
