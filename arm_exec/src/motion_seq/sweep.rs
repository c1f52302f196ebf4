//! Diagnostic sweep targets and records

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::SweepParams;
use crate::kinematics::{ArmGeometry, CartesianPos, JointAngles};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default start height of the sweep below the whole part of the second
/// link's length.
///
/// Units: same as the link lengths
pub const DEFAULT_Z_START_BELOW_L2: f64 = 10.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The outcome of one sweep step.
///
/// Flat so that it can be archived as a CSV row. Fields after `reachable`
/// are empty for unreachable steps.
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    pub step: u32,

    pub target_x: f64,
    pub target_z: f64,

    pub reachable: bool,

    pub elbow_abs_deg: Option<f64>,
    pub shoulder_deg: Option<f64>,

    /// Forward kinematics of the solved angles.
    pub fk_x: Option<f64>,
    pub fk_z: Option<f64>,

    /// Target minus forward kinematics.
    pub diff_x: Option<f64>,
    pub diff_z: Option<f64>,

    /// Forward kinematics of the measured angles after the step.
    pub achieved_x: Option<f64>,
    pub achieved_z: Option<f64>,

    pub drive_cycles: Option<u32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SweepRecord {
    pub fn reached(
        step: u32,
        target: &CartesianPos,
        angles: &JointAngles,
        fk: &CartesianPos,
        achieved: &CartesianPos,
        drive_cycles: u32,
    ) -> Self {
        let diff = target.sub(fk);

        Self {
            step,
            target_x: target.x,
            target_z: target.z,
            reachable: true,
            elbow_abs_deg: Some(angles.elbow_abs_deg),
            shoulder_deg: Some(angles.shoulder_deg),
            fk_x: Some(fk.x),
            fk_z: Some(fk.z),
            diff_x: Some(diff.x),
            diff_z: Some(diff.z),
            achieved_x: Some(achieved.x),
            achieved_z: Some(achieved.z),
            drive_cycles: Some(drive_cycles),
        }
    }

    pub fn unreachable(step: u32, target: &CartesianPos) -> Self {
        Self {
            step,
            target_x: target.x,
            target_z: target.z,
            reachable: false,
            elbow_abs_deg: None,
            shoulder_deg: None,
            fk_x: None,
            fk_z: None,
            diff_x: None,
            diff_z: None,
            achieved_x: None,
            achieved_z: None,
            drive_cycles: None,
        }
    }
}

impl SweepParams {
    /// The sweep line `(x, z_start)` for the given arm.
    ///
    /// Unless set in the parameters, `x` is the whole part of `L1` and
    /// `z_start` is the whole part of `L2` less `DEFAULT_Z_START_BELOW_L2`.
    pub fn line(&self, geom: &ArmGeometry) -> (f64, f64) {
        (
            self.x.unwrap_or_else(|| geom.l1().trunc()),
            self.z_start
                .unwrap_or_else(|| geom.l2().trunc() - DEFAULT_Z_START_BELOW_L2),
        )
    }

    /// The targets visited by the sweep for the given arm, in order.
    pub fn targets(&self, geom: &ArmGeometry) -> Vec<CartesianPos> {
        let (x, z_start) = self.line(geom);

        (1..=self.steps)
            .map(|i| CartesianPos::new(x, z_start + i as f64 * self.z_step))
            .collect()
    }
}
