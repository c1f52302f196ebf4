//! Motion sequencer module
//!
//! Runs the arm through its fixed list of operating phases, from sensor
//! calibration through homing, the diagnostic sweep and the three
//! behaviours to completion. See [`Phase`] for the order.
//!
//! A run always starts from [`Phase::Calibrate`] and is not resumable. The
//! first failure stops the arm and ends the run.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod phase;
mod state;
mod sweep;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::arm_driver::ArmError;
use crate::behaviour::{BehaviourError, BehaviourReport};

pub use params::*;
pub use phase::*;
pub use state::*;
pub use sweep::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a complete run of the sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeqReport {
    /// Phases run, in the order they completed.
    pub completed_phases: Vec<Phase>,

    /// One record per sweep step.
    pub sweep: Vec<SweepRecord>,

    /// One report per behaviour, in the order they ran.
    pub behaviours: Vec<BehaviourReport>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can end a run of the sequence.
#[derive(Debug, thiserror::Error)]
pub enum SeqError {
    #[error("Arm failure during the {phase} phase: {source}")]
    Arm {
        phase: Phase,
        #[source]
        source: ArmError,
    },

    #[error("Behaviour failure during the {phase} phase: {source}")]
    Behaviour {
        phase: Phase,
        #[source]
        source: BehaviourError,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SeqError {
    /// The phase which failed.
    pub fn phase(&self) -> Phase {
        match self {
            SeqError::Arm { phase, .. } => *phase,
            SeqError::Behaviour { phase, .. } => *phase,
        }
    }
}
