//! Behaviours module
//!
//! Sensor guided and manual behaviours run by the motion sequencer. Each
//! behaviour is expressed only in terms of the equipment traits and the
//! [`ArmActuation`] capability, so it runs unchanged against real or
//! simulated equipment.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod line_follow;
mod params;
mod teleop;
mod ultrasonic_follow;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::arm_driver::{ArmActuation, ArmError};
use crate::kinematics::ArmGeometry;
use arm_if::eqpt::EqptError;

pub use line_follow::*;
pub use params::*;
pub use teleop::*;
pub use ultrasonic_follow::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A behaviour which takes control of the arm until it completes.
pub trait Behaviour {
    /// Short name of the behaviour, used in logs and reports.
    fn name(&self) -> &'static str;

    /// Prepare the behaviour's equipment, called once before any behaviour
    /// is run.
    fn prepare(&mut self) -> Result<(), BehaviourError> {
        Ok(())
    }

    /// Run the behaviour to completion.
    fn run(
        &mut self,
        arm: &mut dyn ArmActuation,
        geom: &ArmGeometry,
    ) -> Result<BehaviourReport, BehaviourError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a completed behaviour.
#[derive(Debug, Clone, Serialize)]
pub struct BehaviourReport {
    pub behaviour: String,

    /// Number of cycles the behaviour ran for.
    pub cycles: u32,

    /// Number of targets which could not be reached and were skipped.
    pub unreachable_targets: u32,

    pub exit: BehaviourExit,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Why a behaviour finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BehaviourExit {
    /// The behaviour ran all its cycles.
    Completed,

    /// The line was not seen for too many consecutive cycles.
    LineLost,

    /// The operator pressed the exit button.
    OperatorExit,

    /// The cycle limit was reached before any other exit condition.
    CycleLimit,
}

/// Possible errors that can occur while running a behaviour.
#[derive(Debug, thiserror::Error)]
pub enum BehaviourError {
    #[error("Equipment error: {0}")]
    Eqpt(#[from] EqptError),

    #[error("Arm error: {0}")]
    Arm(#[from] ArmError),
}
