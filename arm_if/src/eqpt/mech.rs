//! # Mechanisms equipment
//!
//! Capabilities of the arm's actuated joints. Each joint has one encoder, one motor, and one
//! limit switch at its home position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A joint position encoder.
///
/// Angles are reported in the arm's kinematic convention, that is the shoulder angle is measured
/// from the horizontal and the elbow angle is the absolute angle of the second link, also from
/// the horizontal.
pub trait JointEncoder {
    /// Read the current joint angle.
    ///
    /// Units: degrees
    fn angle_deg(&mut self) -> Result<f64, EqptError>;

    /// Redefine the current position of the joint as `angle_deg`.
    ///
    /// Used when homing, as incremental encoders have no absolute reference.
    fn reset(&mut self, angle_deg: f64) -> Result<(), EqptError>;
}

/// A joint motor.
pub trait JointMotor {
    /// Set the motor power.
    ///
    /// Power is normalised to `[-1.0, 1.0]`, positive power increases the joint angle. Demands
    /// outside this range are rejected with [`EqptError::InvalidDemand`].
    fn set_power(&mut self, power: f64) -> Result<(), EqptError>;
}

/// A limit switch at a joint's home position.
pub trait LimitSwitch {
    /// Returns true while the joint is in contact with the switch.
    fn is_pressed(&mut self) -> Result<bool, EqptError>;
}
