//! Parameters structure for the arm driver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::joint_ctrl::JointCtrlParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input parameters for the arm driver.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmDriverParams {
    /// Period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Joints moving slower than this are considered still.
    ///
    /// Units: degrees/second
    pub settle_rate_degs: f64,

    /// Number of consecutive still cycles before the arm is settled.
    pub settle_cycles: u32,

    /// Maximum number of cycles to wait for the arm to settle.
    pub max_settle_cycles: u32,

    /// Magnitude of the power applied when driving onto the limit switches.
    pub homing_power: f64,

    /// Maximum number of cycles to wait for both joints to be homed.
    pub max_homing_cycles: u32,

    /// Number of consecutive on target cycles before a drive is complete.
    pub on_target_cycles: u32,

    /// Maximum number of cycles for a single drive.
    pub max_drive_cycles: u32,

    pub shoulder: JointDriverParams,

    pub elbow: JointDriverParams,
}

/// Parameters for one joint.
#[derive(Debug, Clone, Deserialize)]
pub struct JointDriverParams {
    /// Angle of the joint when its limit switch is pressed.
    ///
    /// Units: degrees
    pub home_deg: f64,

    /// Position controller for the joint.
    pub ctrl: JointCtrlParams,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file() {
        let params: ArmDriverParams =
            util::params::load_from_str(include_str!("../../../params/arm_driver.toml")).unwrap();

        assert!(params.cycle_period_s > 0.0);
        assert!(params.homing_power > 0.0 && params.homing_power <= 1.0);
        assert!(params.settle_cycles <= params.max_settle_cycles);
        assert!(params.shoulder.ctrl.validate().is_ok());
        assert!(params.elbow.ctrl.validate().is_ok());
    }
}
