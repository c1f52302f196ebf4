//! Arm driver module
//!
//! Closed-loop actuation of both joints. The driver owns the joints'
//! equipment and one [`JointCtrl`](crate::joint_ctrl::JointCtrl) per joint,
//! and exposes the blocking operations the motion sequencer and behaviours
//! need through the [`ArmActuation`] trait.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::joint_ctrl::JointCtrlError;
use crate::kinematics::JointAngles;
use arm_if::eqpt::{EqptError, JointId};

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Blocking actuation of the arm's joints.
///
/// Every operation returns once its stopping condition is met or it fails.
pub trait ArmActuation {
    /// Read the current joint angles.
    fn angles(&mut self) -> Result<JointAngles, ArmError>;

    /// Hold the arm at its current angles.
    fn stabilise(&mut self, hold: Hold) -> Result<(), ArmError>;

    /// Drive both joints onto their limit switches and zero the encoders
    /// there.
    fn home(&mut self) -> Result<(), ArmError>;

    /// Drive both joints to the target angles.
    fn drive_to(&mut self, target: &JointAngles) -> Result<DriveReport, ArmError>;

    /// Remove power from both joints.
    fn stop(&mut self) -> Result<(), ArmError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of a successful [`ArmActuation::drive_to`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DriveReport {
    /// Number of control cycles taken to reach the target.
    pub cycles: u32,

    /// Joint angles measured at the end of the drive.
    pub final_angles: JointAngles,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How long [`ArmActuation::stabilise`] holds the arm for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// Until both joints have stopped moving.
    UntilSettled,

    /// For a fixed number of control cycles.
    Cycles(u32),
}

/// Possible errors that can occur during arm actuation.
#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    #[error("Equipment error on the {joint} joint: {source}")]
    Eqpt {
        joint: JointId,
        #[source]
        source: EqptError,
    },

    #[error("Invalid arm driver parameters: {0}")]
    InvalidParams(String),

    #[error("Joint control error: {0}")]
    JointCtrl(#[from] JointCtrlError),

    #[error("The arm did not settle within {0} cycles")]
    SettleTimeout(u32),

    #[error("The {joint} joint did not reach its limit switch within {cycles} cycles")]
    HomingTimeout { joint: JointId, cycles: u32 },

    #[error("The arm did not reach {target:?} within {cycles} cycles")]
    DriveTimeout { target: JointAngles, cycles: u32 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: ArmActuation + ?Sized> ArmActuation for &mut T {
    fn angles(&mut self) -> Result<JointAngles, ArmError> {
        (**self).angles()
    }

    fn stabilise(&mut self, hold: Hold) -> Result<(), ArmError> {
        (**self).stabilise(hold)
    }

    fn home(&mut self) -> Result<(), ArmError> {
        (**self).home()
    }

    fn drive_to(&mut self, target: &JointAngles) -> Result<DriveReport, ArmError> {
        (**self).drive_to(target)
    }

    fn stop(&mut self) -> Result<(), ArmError> {
        (**self).stop()
    }
}

#[cfg(test)]
pub(crate) mod mock;
