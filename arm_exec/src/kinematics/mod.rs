//! # Kinematics module
//!
//! Pure forward and inverse kinematics for the two link planar arm. The arm is anchored at the
//! origin of the x-z plane, the shoulder rotates the first link (length `L1`) about the origin
//! and the elbow joins the second link (length `L2`) onto the end of the first.
//!
//! # Angle convention
//!
//! Both joint angles are *absolute*, measured from the +x axis towards +z:
//!
//! - `shoulder_deg` is the orientation of the first link.
//! - `elbow_abs_deg` is the orientation of the second link. It is **not** relative to the first
//!   link. The relative (interior) angle is available from [`JointAngles::interior_deg`].
//!
//! Inverse kinematics works with the interior angle internally and converts back to the absolute
//! convention before returning, so its output can always be fed straight into forward
//! kinematics.
//!
//! Nothing in this module holds state, all functions may be called from any thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod forward;
mod inverse;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use params::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Link lengths of the arm.
///
/// Can only be constructed with strictly positive, finite lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmGeometry {
    l1: f64,
    l2: f64,
}

/// A pair of joint angles in the absolute convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Absolute orientation of the second link.
    ///
    /// Units: degrees
    pub elbow_abs_deg: f64,

    /// Orientation of the first link.
    ///
    /// Units: degrees
    pub shoulder_deg: f64,
}

/// A position in the plane of the arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CartesianPos {
    /// Horizontal distance from the shoulder.
    pub x: f64,

    /// Vertical distance from the shoulder.
    pub z: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which of the two inverse kinematics solutions to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElbowConfig {
    /// Positive interior angle, the elbow sits on the clockwise side of the
    /// shoulder-target line.
    Upper,

    /// Negative interior angle, mirror of [`ElbowConfig::Upper`] about the
    /// shoulder-target line.
    Lower,
}

/// Errors which can occur during kinematics calculations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    #[error("Target is {distance} from the shoulder but the arm can only reach {max_reach}")]
    Unreachable { distance: f64, max_reach: f64 },

    #[error("Target coordinates must be finite, got ({x}, {z})")]
    NonFiniteTarget { x: f64, z: f64 },

    #[error("Link lengths must be finite and greater than zero, got L1 = {l1}, L2 = {l2}")]
    InvalidLinkLength { l1: f64, l2: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmGeometry {
    /// Create a new geometry from the two link lengths.
    pub fn new(l1: f64, l2: f64) -> Result<Self, KinematicsError> {
        let valid = |l: f64| l.is_finite() && l > 0.0;

        if valid(l1) && valid(l2) {
            Ok(Self { l1, l2 })
        } else {
            Err(KinematicsError::InvalidLinkLength { l1, l2 })
        }
    }

    /// Length of the first (shoulder to elbow) link.
    pub fn l1(&self) -> f64 {
        self.l1
    }

    /// Length of the second (elbow to end effector) link.
    pub fn l2(&self) -> f64 {
        self.l2
    }

    /// Maximum distance from the shoulder the end effector can reach.
    pub fn max_reach(&self) -> f64 {
        self.l1 + self.l2
    }
}

impl JointAngles {
    pub fn new(elbow_abs_deg: f64, shoulder_deg: f64) -> Self {
        Self {
            elbow_abs_deg,
            shoulder_deg,
        }
    }

    /// The elbow angle relative to the first link.
    ///
    /// Units: degrees
    pub fn interior_deg(&self) -> f64 {
        self.elbow_abs_deg - self.shoulder_deg
    }

    /// Returns true if both angles are finite.
    pub fn is_finite(&self) -> bool {
        self.elbow_abs_deg.is_finite() && self.shoulder_deg.is_finite()
    }
}

impl CartesianPos {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Square of the distance from the origin.
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.z * self.z
    }

    /// Distance from the origin.
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Component-wise difference `self - other`.
    pub fn sub(&self, other: &CartesianPos) -> CartesianPos {
        CartesianPos {
            x: self.x - other.x,
            z: self.z - other.z,
        }
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl Default for ElbowConfig {
    fn default() -> Self {
        ElbowConfig::Upper
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Forward kinematics on plain values.
///
/// Returns `(x, z)` of the end effector for the given absolute elbow angle and shoulder angle,
/// both in degrees.
pub fn forward_kinematics(geom: &ArmGeometry, elbow_deg: f64, shoulder_deg: f64) -> (f64, f64) {
    let p = geom.forward(&JointAngles::new(elbow_deg, shoulder_deg));
    (p.x, p.z)
}

/// Inverse kinematics on plain values, using the upper elbow configuration.
///
/// Returns `(elbow_deg, shoulder_deg)` in the absolute convention.
pub fn inverse_kinematics(
    geom: &ArmGeometry,
    x: f64,
    z: f64,
) -> Result<(f64, f64), KinematicsError> {
    let a = geom.inverse(&CartesianPos::new(x, z), ElbowConfig::Upper)?;
    Ok((a.elbow_abs_deg, a.shoulder_deg))
}
