//! # Equipment interface module

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod mech;
pub mod sens;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

pub use mech::*;
pub use sens::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the arm's joints.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    /// The joint rotating the first link about the arm's origin.
    Shoulder,

    /// The joint between the first and second links.
    Elbow,
}

/// Errors raised by equipment.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EqptError {
    #[error("The {0} is not connected or not responding")]
    Unavailable(String),

    #[error("The {0} returned an invalid reading: {1}")]
    InvalidReading(String, f64),

    #[error("Demand of {1} is outside the range accepted by the {0}")]
    InvalidDemand(String, f64),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A blocking wait.
pub trait Delay {
    /// Block the caller for the given duration.
    fn delay(&mut self, duration: Duration);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// Both joints, in the order used for arrays indexed by joint.
    pub const ALL: [JointId; 2] = [JointId::Shoulder, JointId::Elbow];

    /// Index of the joint into arrays ordered as [`JointId::ALL`].
    pub fn index(&self) -> usize {
        match self {
            JointId::Shoulder => 0,
            JointId::Elbow => 1,
        }
    }
}

impl Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JointId::Shoulder => write!(f, "shoulder"),
            JointId::Elbow => write!(f, "elbow"),
        }
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

impl<T: Delay + ?Sized> Delay for Box<T> {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// [`Delay`] implementation which sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
