//! # Sensor and auxiliary equipment
//!
//! Capabilities used by the sensor-guided behaviours: ultrasonic ranging, line sensing, the
//! chassis the line follower steers, and the operator's joystick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of channels on the line sensor array.
pub const NUM_LINE_CHANNELS: usize = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A reading from the line sensor array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineReading {
    /// Calibrated reflectance of each channel, ordered left, centre, right.
    ///
    /// `0.0` is the calibrated background, `1.0` is the calibrated line.
    pub channels: [f64; NUM_LINE_CHANNELS],
}

/// The state of the joystick at the time it was read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickState {
    /// Horizontal axis, `[-1.0, 1.0]`, positive extends the arm.
    pub x_axis: f64,

    /// Vertical axis, `[-1.0, 1.0]`, positive raises the arm.
    pub z_axis: f64,

    /// The operator is requesting the end of manual control.
    pub exit: bool,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An ultrasonic range finder.
pub trait Ultrasonic {
    /// Get the range to the nearest object, or `None` if no echo was received.
    ///
    /// Units: same as the arm's link lengths.
    fn range(&mut self) -> Result<Option<f64>, EqptError>;
}

/// An array of analog line sensors.
pub trait LineSensor {
    /// Calibrate the background level of each channel.
    ///
    /// Must be performed while the sensors are not over the line.
    fn calibrate(&mut self) -> Result<(), EqptError>;

    /// Read all channels.
    fn read(&mut self) -> Result<LineReading, EqptError>;
}

/// The chassis carrying the arm.
pub trait Chassis {
    /// Set the chassis drive, both demands normalised to `[-1.0, 1.0]`.
    fn set(&mut self, forward: f64, turn: f64) -> Result<(), EqptError>;
}

/// The operator's joystick.
pub trait Joystick {
    /// Read the current joystick state.
    fn read(&mut self) -> Result<JoystickState, EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LineReading {
    /// Returns true if any channel is above the threshold.
    pub fn sees_line(&self, threshold: f64) -> bool {
        self.channels.iter().any(|c| *c > threshold)
    }

    /// Left channel value.
    pub fn left(&self) -> f64 {
        self.channels[0]
    }

    /// Centre channel value.
    pub fn centre(&self) -> f64 {
        self.channels[1]
    }

    /// Right channel value.
    pub fn right(&self) -> f64 {
        self.channels[2]
    }
}
