//! Ultrasonic follower behaviour
//!
//! Keeps the end effector a fixed distance from whatever the ultrasonic
//! sensor sees, reaching out horizontally at a fixed height.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};

// Internal
use super::{Behaviour, BehaviourError, BehaviourExit, BehaviourReport, UltrasonicFollowParams};
use crate::arm_driver::{ArmActuation, Hold};
use crate::kinematics::{ArmGeometry, CartesianPos, ElbowConfig};
use arm_if::eqpt::Ultrasonic;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct UltrasonicFollower<U> {
    params: UltrasonicFollowParams,

    ultrasonic: U,

    elbow_config: ElbowConfig,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<U: Ultrasonic> UltrasonicFollower<U> {
    pub fn new(params: UltrasonicFollowParams, ultrasonic: U, elbow_config: ElbowConfig) -> Self {
        Self {
            params,
            ultrasonic,
            elbow_config,
        }
    }

    /// Horizontal reach demanded for a given range.
    fn reach_for(&self, range: f64) -> f64 {
        clamp(
            range - self.params.standoff,
            self.params.min_reach,
            self.params.max_reach_x,
        )
    }
}

impl<U: Ultrasonic> Behaviour for UltrasonicFollower<U> {
    fn name(&self) -> &'static str {
        "ultrasonic_follow"
    }

    fn run(
        &mut self,
        arm: &mut dyn ArmActuation,
        geom: &ArmGeometry,
    ) -> Result<BehaviourReport, BehaviourError> {
        let mut unreachable_targets = 0;

        for _ in 0..self.params.cycles {
            let range = match self.ultrasonic.range()? {
                Some(r) => r,
                None => {
                    trace!("No ultrasonic echo, holding");
                    arm.stabilise(Hold::Cycles(1))?;
                    continue;
                }
            };

            let target = CartesianPos::new(self.reach_for(range), self.params.z);

            match geom.inverse(&target, self.elbow_config) {
                Ok(angles) => {
                    debug!(
                        "Range {:.2}, reaching to ({:.2}, {:.2})",
                        range, target.x, target.z
                    );
                    arm.drive_to(&angles)?;
                }
                Err(e) => {
                    warn!("Skipping ultrasonic target: {}", e);
                    unreachable_targets += 1;
                    arm.stabilise(Hold::Cycles(1))?;
                }
            }
        }

        Ok(BehaviourReport {
            behaviour: self.name().into(),
            cycles: self.params.cycles,
            unreachable_targets,
            exit: BehaviourExit::Completed,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_driver::{mock::MockArm, ArmDriver};
    use crate::sim::{Sim, SimFault};
    use arm_if::eqpt::JointId;

    fn params() -> UltrasonicFollowParams {
        UltrasonicFollowParams {
            cycles: 20,
            standoff: 5.0,
            z: 5.0,
            min_reach: 5.0,
            max_reach_x: 18.0,
        }
    }

    #[test]
    fn test_reach_clamped() {
        let sim = Sim::new(crate::sim::test_params()).unwrap();
        let follower = UltrasonicFollower::new(params(), sim.ultrasonic(), ElbowConfig::Upper);

        assert_eq!(follower.reach_for(15.0), 10.0);
        assert_eq!(follower.reach_for(6.0), 5.0);
        assert_eq!(follower.reach_for(40.0), 18.0);
    }

    #[test]
    fn test_follow() -> Result<(), BehaviourError> {
        let sim = Sim::new(crate::sim::test_params()).unwrap();
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();
        let mut arm = MockArm::default();

        // The simulated target sits at its mean range while time is stopped
        let mut follower = UltrasonicFollower::new(params(), sim.ultrasonic(), ElbowConfig::Upper);
        let report = follower.run(&mut arm, &geom)?;

        assert_eq!(report.cycles, 20);
        assert_eq!(report.unreachable_targets, 0);
        assert_eq!(report.exit, BehaviourExit::Completed);
        assert_eq!(arm.drives.len(), 20);

        let reached = geom.forward(&arm.angles);
        assert!((reached.x - 10.0).abs() < 1e-9);
        assert!((reached.z - 5.0).abs() < 1e-9);

        Ok(())
    }

    #[test]
    fn test_unreachable_skipped() -> Result<(), BehaviourError> {
        let sim = Sim::new(crate::sim::test_params()).unwrap();
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();
        let mut arm = MockArm::default();

        let mut p = params();
        p.z = 25.0;
        let mut follower = UltrasonicFollower::new(p, sim.ultrasonic(), ElbowConfig::Upper);
        let report = follower.run(&mut arm, &geom)?;

        assert_eq!(report.unreachable_targets, 20);
        assert!(arm.drives.is_empty());
        assert_eq!(arm.holds, vec![Hold::Cycles(1); 20]);

        Ok(())
    }

    #[test]
    fn test_follow_on_sim() -> Result<(), BehaviourError> {
        let sim = Sim::new(crate::sim::test_params()).unwrap();
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();
        let driver_params =
            util::params::load_from_str(include_str!("../../../params/arm_driver.toml")).unwrap();
        let mut arm = ArmDriver::new(
            driver_params,
            sim.joint_eqpt(JointId::Shoulder),
            sim.joint_eqpt(JointId::Elbow),
            sim.delay(false),
        )?;

        let mut follower = UltrasonicFollower::new(params(), sim.ultrasonic(), ElbowConfig::Upper);
        let report = follower.run(&mut arm, &geom)?;

        assert_eq!(report.cycles, 20);
        assert!(sim.time_s() > 0.0);

        let reached = geom.forward(&arm.angles()?);
        assert!((reached.z - 5.0).abs() < 0.5);

        Ok(())
    }

    #[test]
    fn test_sensor_failure() {
        let sim = Sim::new(crate::sim::test_params()).unwrap();
        let geom = ArmGeometry::new(10.0, 10.0).unwrap();
        let mut arm = MockArm::default();

        sim.set_fault(SimFault::Ultrasonic);
        let mut follower = UltrasonicFollower::new(params(), sim.ultrasonic(), ElbowConfig::Upper);

        assert!(matches!(
            follower.run(&mut arm, &geom),
            Err(BehaviourError::Eqpt(_))
        ));
    }
}
