//! # Arm Executable Parameters
//!
//! All parameter files used by the arm executable, loaded together.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::arm_driver::ArmDriverParams;
use crate::behaviour::BehaviourParams;
use crate::kinematics::KinematicsParams;
use crate::motion_seq::SeqParams;
use crate::sim::SimParams;
use util::params::{self, LoadError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ArmExecParams {
    pub kinematics: KinematicsParams,

    pub arm_driver: ArmDriverParams,

    pub motion_seq: SeqParams,

    pub behaviour: BehaviourParams,

    pub sim: SimParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmExecParams {
    /// Load every parameter file from the software root's `params`
    /// directory.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self {
            kinematics: params::load("kinematics.toml")?,
            arm_driver: params::load("arm_driver.toml")?,
            motion_seq: params::load("motion_seq.toml")?,
            behaviour: params::load("behaviour.toml")?,
            sim: params::load("sim.toml")?,
        })
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> ArmExecParams {
    use util::params::load_from_str;

    ArmExecParams {
        kinematics: load_from_str(include_str!("../../params/kinematics.toml")).unwrap(),
        arm_driver: load_from_str(include_str!("../../params/arm_driver.toml")).unwrap(),
        motion_seq: load_from_str(include_str!("../../params/motion_seq.toml")).unwrap(),
        behaviour: load_from_str(include_str!("../../params/behaviour.toml")).unwrap(),
        sim: load_from_str(include_str!("../../params/sim.toml")).unwrap(),
    }
}
