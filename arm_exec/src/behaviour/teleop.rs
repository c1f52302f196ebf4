//! Joystick teleoperation behaviour
//!
//! The operator moves the end effector in the plane of the arm with the
//! joystick's two axes. Targets the arm cannot reach are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};

// Internal
use super::{Behaviour, BehaviourError, BehaviourExit, BehaviourReport, TeleopParams};
use crate::arm_driver::{ArmActuation, Hold};
use crate::kinematics::{ArmGeometry, CartesianPos, ElbowConfig};
use arm_if::eqpt::Joystick;
use util::maths::{clamp, dead_band};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct JoystickTeleop<J> {
    params: TeleopParams,

    joystick: J,

    elbow_config: ElbowConfig,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<J: Joystick> JoystickTeleop<J> {
    pub fn new(params: TeleopParams, joystick: J, elbow_config: ElbowConfig) -> Self {
        Self {
            params,
            joystick,
            elbow_config,
        }
    }

    /// Movement demanded by one axis in one cycle.
    fn axis_step(&self, axis: f64) -> f64 {
        dead_band(clamp(axis, -1.0, 1.0), self.params.dead_band) * self.params.speed
    }

    fn report(&self, cycles: u32, unreachable_targets: u32, exit: BehaviourExit) -> BehaviourReport {
        BehaviourReport {
            behaviour: self.name().into(),
            cycles,
            unreachable_targets,
            exit,
        }
    }
}

impl<J: Joystick> Behaviour for JoystickTeleop<J> {
    fn name(&self) -> &'static str {
        "teleop"
    }

    fn run(
        &mut self,
        arm: &mut dyn ArmActuation,
        geom: &ArmGeometry,
    ) -> Result<BehaviourReport, BehaviourError> {
        let mut target = geom.forward(&arm.angles()?);
        let mut unreachable_targets = 0;

        info!("Teleop starting from ({:.2}, {:.2})", target.x, target.z);

        for cycle in 1..=self.params.max_cycles {
            let state = self.joystick.read()?;

            if state.exit {
                info!("Operator ended teleop");
                return Ok(self.report(cycle, unreachable_targets, BehaviourExit::OperatorExit));
            }

            let dx = self.axis_step(state.x_axis);
            let dz = self.axis_step(state.z_axis);

            if dx == 0.0 && dz == 0.0 {
                arm.stabilise(Hold::Cycles(1))?;
                continue;
            }

            let candidate = CartesianPos::new(target.x + dx, target.z + dz);

            match geom.inverse(&candidate, self.elbow_config) {
                Ok(angles) => {
                    debug!("Teleop target ({:.2}, {:.2})", candidate.x, candidate.z);
                    arm.drive_to(&angles)?;
                    target = candidate;
                }
                Err(e) => {
                    warn!("Rejected teleop target: {}", e);
                    unreachable_targets += 1;
                    arm.stabilise(Hold::Cycles(1))?;
                }
            }
        }

        Ok(self.report(
            self.params.max_cycles,
            unreachable_targets,
            BehaviourExit::CycleLimit,
        ))
    }
}
