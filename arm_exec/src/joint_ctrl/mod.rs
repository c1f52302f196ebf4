//! Joint control module
//!
//! Closed-loop position control of a single joint. One [`JointCtrl`] runs per joint, each cycle
//! it takes the target and measured angles and produces a motor power demand.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during JointCtrl operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JointCtrlError {
    #[error("JointCtrl has not been initialised")]
    NotInitialised,

    #[error("Recieved a non-finite input (target {target_deg}, measured {measured_deg}, dt {dt_s})")]
    NonFiniteInput {
        target_deg: f64,
        measured_deg: f64,
        dt_s: f64,
    },

    #[error("Invalid JointCtrl parameters: {0}")]
    InvalidParams(String),
}
