//! Parameters structure for JointCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control of one joint.
#[derive(Debug, Clone, Deserialize)]
pub struct JointCtrlParams {
    /// Proportional gain
    ///
    /// Units: power/degree
    pub k_p: f64,

    /// Integral gain
    ///
    /// Units: power/(degree second)
    pub k_i: f64,

    /// Derivative gain
    ///
    /// Units: power second/degree
    pub k_d: f64,

    /// Limit on the magnitude of the accumulated integral term, prevents
    /// windup while the motor is saturated.
    ///
    /// Units: degree seconds
    pub integral_limit: f64,

    /// Maximum magnitude of the power demand, between 0 and 1.
    pub max_power: f64,

    /// Error magnitude below which the joint is considered on target.
    ///
    /// Units: degrees
    pub on_target_tol_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointCtrlParams {
    /// Check the parameters are self-consistent.
    pub fn validate(&self) -> Result<(), super::JointCtrlError> {
        let gains_valid = [self.k_p, self.k_i, self.k_d]
            .iter()
            .all(|k| k.is_finite() && *k >= 0.0);

        if !gains_valid {
            return Err(super::JointCtrlError::InvalidParams(
                "gains must be finite and non-negative".into(),
            ));
        }
        if !(self.max_power > 0.0 && self.max_power <= 1.0) {
            return Err(super::JointCtrlError::InvalidParams(format!(
                "max_power must be in (0, 1], got {}",
                self.max_power
            )));
        }
        if !(self.integral_limit >= 0.0) || !(self.on_target_tol_deg > 0.0) {
            return Err(super::JointCtrlError::InvalidParams(
                "integral_limit must be non-negative and on_target_tol_deg positive".into(),
            ));
        }

        Ok(())
    }
}
