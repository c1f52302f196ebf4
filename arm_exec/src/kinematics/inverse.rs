//! Inverse kinematics
//!
//! The inverse solution follows the standard two link derivation. With `r` the distance from the
//! shoulder to the target, the law of cosines gives the cosine of the interior elbow angle:
//!
//! ```text
//! D = (r^2 - L1^2 - L2^2) / (2 L1 L2)
//! ```
//!
//! The interior angle is then `theta = +/- acos(D)`, where the sign selects the elbow
//! configuration, and the shoulder is the direction to the target less the angular offset the
//! second link introduces:
//!
//! ```text
//! shoulder = atan2(z, x) - atan2(L2 sin(theta), L1 + L2 cos(theta))
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::{clamp, rad_to_deg};

use super::{ArmGeometry, CartesianPos, ElbowConfig, JointAngles, KinematicsError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Relative tolerance applied to the squared reach when checking reachability.
///
/// Targets computed to lie exactly on the reach boundary can land a few ULP outside it.
const REACH_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmGeometry {
    /// Normalised discriminant, the cosine of the interior elbow angle needed to reach `target`.
    ///
    /// This value is not clamped, it lies outside `[-1, 1]` for targets beyond the arm's reach
    /// or (when `L1 != L2`) inside its inner dead zone.
    pub fn discriminant(&self, target: &CartesianPos) -> f64 {
        (target.norm_squared() - self.l1 * self.l1 - self.l2 * self.l2)
            / (2.0 * self.l1 * self.l2)
    }

    /// Returns true if `target` is within the arm's maximum reach.
    ///
    /// Non-finite targets are never reachable.
    pub fn is_reachable(&self, target: &CartesianPos) -> bool {
        target.is_finite()
            && target.norm_squared() <= self.max_reach().powi(2) * (1.0 + REACH_TOLERANCE)
    }

    /// Calculate the joint angles which place the end effector at `target`.
    ///
    /// The returned elbow angle is in the absolute convention (interior angle plus shoulder
    /// angle), so the result can be passed directly to [`ArmGeometry::forward`].
    ///
    /// # Errors
    /// - [`KinematicsError::NonFiniteTarget`] if either coordinate is NaN or infinite.
    /// - [`KinematicsError::Unreachable`] if the target is further than `L1 + L2` from the
    ///   shoulder.
    ///
    /// # Notes
    /// - When `L1 != L2` targets closer than `|L1 - L2|` pass the reachability check. The
    ///   discriminant is clamped so they produce the fully folded pose pointing at the target,
    ///   which is the closest the arm can get but does not reach it.
    pub fn inverse(
        &self,
        target: &CartesianPos,
        config: ElbowConfig,
    ) -> Result<JointAngles, KinematicsError> {
        if !target.is_finite() {
            return Err(KinematicsError::NonFiniteTarget {
                x: target.x,
                z: target.z,
            });
        }

        if !self.is_reachable(target) {
            return Err(KinematicsError::Unreachable {
                distance: target.norm(),
                max_reach: self.max_reach(),
            });
        }

        // Rounding can push D just outside the domain of acos at the boundary
        let d = clamp(self.discriminant(target), -1.0, 1.0);

        let interior_rad = match config {
            ElbowConfig::Upper => d.acos(),
            ElbowConfig::Lower => -d.acos(),
        };

        let shoulder_rad = target.z.atan2(target.x)
            - (self.l2 * interior_rad.sin()).atan2(self.l1 + self.l2 * interior_rad.cos());

        Ok(JointAngles {
            elbow_abs_deg: rad_to_deg(interior_rad + shoulder_rad),
            shoulder_deg: rad_to_deg(shoulder_rad),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(geom: &ArmGeometry, target: CartesianPos, config: ElbowConfig) {
        let angles = geom.inverse(&target, config).unwrap();
        assert!(angles.is_finite());

        let p = geom.forward(&angles);
        let tol = 1e-6 * geom.max_reach();
        assert!(
            (p.x - target.x).abs() < tol && (p.z - target.z).abs() < tol,
            "{:?} with {:?} solved to {:?} which reaches {:?}",
            target,
            config,
            angles,
            p
        );
    }

    #[test]
    fn test_round_trip_grid() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        // Sweep the whole workspace disc, every quadrant included
        for i in -20..=20 {
            for j in -20..=20 {
                let target = CartesianPos::new(i as f64, j as f64);
                if !geom.is_reachable(&target) {
                    continue;
                }
                round_trip(&geom, target, ElbowConfig::Upper);
                round_trip(&geom, target, ElbowConfig::Lower);
            }
        }
    }

    #[test]
    fn test_round_trip_unequal_links() {
        // Long second link, so L1 + L2 cos(theta) goes negative for folded poses
        let geom = ArmGeometry::new(4.0, 9.0).unwrap();

        for target in &[
            CartesianPos::new(6.0, 0.0),
            CartesianPos::new(-5.5, 2.0),
            CartesianPos::new(0.0, -12.0),
            CartesianPos::new(3.0, 11.5),
        ] {
            round_trip(&geom, *target, ElbowConfig::Upper);
            round_trip(&geom, *target, ElbowConfig::Lower);
        }
    }

    #[test]
    fn test_boundary_fully_extended() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        let angles = geom.inverse(&CartesianPos::new(20.0, 0.0), ElbowConfig::Upper).unwrap();
        assert!(angles.interior_deg().abs() < 1e-6);
        assert!(angles.shoulder_deg.abs() < 1e-6);

        // On the boundary along a diagonal, where x^2 + z^2 is subject to rounding
        let r = geom.max_reach();
        let diag = CartesianPos::new(r * 0.6, r * 0.8);
        let angles = geom.inverse(&diag, ElbowConfig::Upper).unwrap();
        assert!(angles.is_finite());
        assert!(angles.interior_deg().abs() < 1e-3);
        round_trip(&geom, diag, ElbowConfig::Upper);
    }

    #[test]
    fn test_clamped_just_beyond_reach() -> Result<(), KinematicsError> {
        let geom = ArmGeometry::new(10.0, 10.0)?;

        // Inside the reach tolerance but with D just above 1
        let target = CartesianPos::new(20.0 * (1.0 + 1e-10), 0.0);
        assert!(geom.is_reachable(&target));
        assert!(geom.discriminant(&target) > 1.0);

        for config in &[ElbowConfig::Upper, ElbowConfig::Lower] {
            let angles = geom.inverse(&target, *config)?;
            assert!(angles.is_finite());
            assert!(angles.interior_deg().abs() < 1e-6);
            assert!(angles.shoulder_deg.abs() < 1e-6);
        }

        Ok(())
    }

    #[test]
    fn test_example_targets() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        round_trip(&geom, CartesianPos::new(10.0, 0.0), ElbowConfig::Upper);

        assert_eq!(
            geom.inverse(&CartesianPos::new(30.0, 0.0), ElbowConfig::Upper),
            Err(KinematicsError::Unreachable {
                distance: 30.0,
                max_reach: 20.0
            })
        );
    }

    #[test]
    fn test_known_solution() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        // Target directly above the shoulder at sqrt(2) * 10: a right angle elbow
        let target = CartesianPos::new(0.0, 200f64.sqrt());
        let angles = geom.inverse(&target, ElbowConfig::Upper).unwrap();

        assert!((angles.interior_deg() - 90.0).abs() < 1e-9);
        assert!((angles.shoulder_deg - 45.0).abs() < 1e-9);
        assert!((angles.elbow_abs_deg - 135.0).abs() < 1e-9);

        let angles = geom.inverse(&target, ElbowConfig::Lower).unwrap();
        assert!((angles.interior_deg() + 90.0).abs() < 1e-9);
        assert!((angles.shoulder_deg - 135.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_and_non_finite() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        assert!(!geom.is_reachable(&CartesianPos::new(20.001, 0.0)));
        assert!(matches!(
            geom.inverse(&CartesianPos::new(0.0, -21.0), ElbowConfig::Lower),
            Err(KinematicsError::Unreachable { .. })
        ));
        assert!(matches!(
            geom.inverse(&CartesianPos::new(f64::NAN, 1.0), ElbowConfig::Upper),
            Err(KinematicsError::NonFiniteTarget { .. })
        ));
        assert!(matches!(
            geom.inverse(&CartesianPos::new(1.0, f64::INFINITY), ElbowConfig::Upper),
            Err(KinematicsError::NonFiniteTarget { .. })
        ));
    }

    #[test]
    fn test_no_nan_inside_dead_zone() {
        // Targets closer than |L1 - L2| get the folded pose
        let geom = ArmGeometry::new(10.0, 4.0).unwrap();

        for target in &[
            CartesianPos::new(0.0, 0.0),
            CartesianPos::new(2.0, 1.0),
            CartesianPos::new(-3.0, -3.0),
        ] {
            assert!(geom.discriminant(target) < -1.0);

            let angles = geom.inverse(target, ElbowConfig::Upper).unwrap();
            assert!(angles.is_finite());
            assert!((angles.interior_deg() - 180.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_discriminant() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        assert!((geom.discriminant(&CartesianPos::new(20.0, 0.0)) - 1.0).abs() < 1e-12);
        assert!((geom.discriminant(&CartesianPos::new(0.0, 0.0)) + 1.0).abs() < 1e-12);
        assert!(geom.discriminant(&CartesianPos::new(0.0, 200f64.sqrt())).abs() < 1e-12);
    }
}
