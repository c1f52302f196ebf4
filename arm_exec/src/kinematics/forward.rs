//! Forward kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::deg_to_rad;

use super::{ArmGeometry, CartesianPos, JointAngles};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmGeometry {
    /// Calculate the end effector position for the given joint angles.
    ///
    /// Both angles are absolute, so the position is the sum of the two link vectors:
    ///
    /// ```text
    /// x = L1 cos(shoulder) + L2 cos(elbow)
    /// z = L1 sin(shoulder) + L2 sin(elbow)
    /// ```
    ///
    /// Always produces a finite result for finite angles.
    pub fn forward(&self, angles: &JointAngles) -> CartesianPos {
        let shoulder_rad = deg_to_rad(angles.shoulder_deg);
        let elbow_rad = deg_to_rad(angles.elbow_abs_deg);

        CartesianPos {
            x: shoulder_rad.cos() * self.l1 + elbow_rad.cos() * self.l2,
            z: shoulder_rad.sin() * self.l1 + elbow_rad.sin() * self.l2,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_zero_angles_fully_extended() {
        let geom = ArmGeometry::new(10.0, 4.0).unwrap();
        let p = geom.forward(&JointAngles::new(0.0, 0.0));

        assert!((p.x - 14.0).abs() < TOL);
        assert!(p.z.abs() < TOL);
    }

    #[test]
    fn test_absolute_elbow_convention() {
        let geom = ArmGeometry::new(10.0, 4.0).unwrap();

        // Shoulder straight up, second link horizontal. If the elbow angle were relative this
        // would point the second link straight down instead.
        let p = geom.forward(&JointAngles::new(0.0, 90.0));
        assert!((p.x - 4.0).abs() < TOL);
        assert!((p.z - 10.0).abs() < TOL);

        // Both links straight up
        let p = geom.forward(&JointAngles::new(90.0, 90.0));
        assert!(p.x.abs() < TOL);
        assert!((p.z - 14.0).abs() < TOL);
    }

    #[test]
    fn test_folded() {
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();

        // Second link folded back onto the first
        let p = geom.forward(&JointAngles::new(225.0, 45.0));
        assert!(p.norm() < TOL);
    }
}
