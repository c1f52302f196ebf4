//! Simulated equipment
//!
//! A deterministic stand-in for the arm's hardware. All handles share a
//! single [`SimWorld`], time only advances when a [`SimDelay`] is performed,
//! so a run with the same parameters always produces the same result.
//!
//! The world is shared through `Rc<RefCell<_>>` and is therefore confined to
//! one thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod eqpt;
mod params;
mod world;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use arm_if::eqpt::JointId;

use crate::arm_driver::{ArmDriver, ArmError, JointEqpt};
use crate::behaviour::{JoystickTeleop, LineFollower, UltrasonicFollower};
use crate::kinematics::KinematicsError;
use crate::motion_seq::{MotionSeq, SeqBehaviours};
use crate::params::ArmExecParams;

pub use eqpt::*;
pub use params::*;
pub use world::SimWorld;

type SharedWorld = Rc<RefCell<SimWorld>>;

/// An arm driver running on simulated equipment.
pub type SimArmDriver = ArmDriver<SimEncoder, SimMotor, SimLimitSwitch, SimDelay>;

/// A motion sequencer running on simulated equipment.
pub type SimMotionSeq = MotionSeq<SimArmDriver, SimDelay>;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle to the simulation, used to create equipment and inspect the
/// world.
#[derive(Clone)]
pub struct Sim {
    world: SharedWorld,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Equipment faults which can be injected into the simulation.
///
/// While a fault is set every access to that equipment fails with
/// `EqptError::Unavailable`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SimFault {
    Encoder(JointId),
    Motor(JointId),
    LimitSwitch(JointId),
    Ultrasonic,
    LineSensor,
    Chassis,
    Joystick,
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid arm geometry: {0}")]
    Geometry(#[from] KinematicsError),

    #[error("Could not create the arm driver: {0}")]
    ArmDriver(#[from] ArmError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sim {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        Ok(Self {
            world: Rc::new(RefCell::new(SimWorld::new(params)?)),
        })
    }

    /// The encoder, motor and limit switch of one joint.
    pub fn joint_eqpt(&self, joint: JointId) -> JointEqpt<SimEncoder, SimMotor, SimLimitSwitch> {
        JointEqpt {
            encoder: SimEncoder {
                world: self.world.clone(),
                joint,
            },
            motor: SimMotor {
                world: self.world.clone(),
                joint,
            },
            limit_switch: SimLimitSwitch {
                world: self.world.clone(),
                joint,
            },
        }
    }

    pub fn ultrasonic(&self) -> SimUltrasonic {
        SimUltrasonic {
            world: self.world.clone(),
        }
    }

    pub fn line_sensor(&self) -> SimLineSensor {
        SimLineSensor {
            world: self.world.clone(),
        }
    }

    pub fn chassis(&self) -> SimChassis {
        SimChassis {
            world: self.world.clone(),
        }
    }

    pub fn joystick(&self) -> SimJoystick {
        SimJoystick {
            world: self.world.clone(),
        }
    }

    /// A delay which advances the world, optionally also sleeping so the
    /// simulation runs in real time.
    pub fn delay(&self, real_time: bool) -> SimDelay {
        SimDelay {
            world: self.world.clone(),
            real_time,
        }
    }

    /// Simulated time since the start.
    ///
    /// Units: seconds
    pub fn time_s(&self) -> f64 {
        self.world.borrow().time_s()
    }

    /// True angle of a joint.
    ///
    /// Units: degrees
    pub fn joint_angle_deg(&self, joint: JointId) -> f64 {
        self.world.borrow().joint_angle_deg(joint)
    }

    /// Power currently applied to a joint's motor.
    pub fn motor_power(&self, joint: JointId) -> f64 {
        self.world.borrow().motor_power(joint)
    }

    /// Current chassis demand as (forward, turn).
    pub fn chassis_demand(&self) -> (f64, f64) {
        self.world.borrow().chassis_demand()
    }

    /// Total distance driven by the chassis.
    pub fn chassis_travelled(&self) -> f64 {
        self.world.borrow().chassis_travelled()
    }

    /// Build the complete motion sequencer on top of this simulation.
    pub fn motion_seq(
        &self,
        params: &ArmExecParams,
        real_time: bool,
    ) -> Result<SimMotionSeq, SimError> {
        let geom = params.kinematics.geometry()?;
        let elbow_config = params.kinematics.elbow_config;

        let arm = ArmDriver::new(
            params.arm_driver.clone(),
            self.joint_eqpt(JointId::Shoulder),
            self.joint_eqpt(JointId::Elbow),
            self.delay(real_time),
        )?;

        let behaviours = SeqBehaviours {
            ultrasonic: Box::new(UltrasonicFollower::new(
                params.behaviour.ultrasonic.clone(),
                self.ultrasonic(),
                elbow_config,
            )),
            line: Box::new(LineFollower::new(
                params.behaviour.line.clone(),
                self.line_sensor(),
                self.chassis(),
                self.delay(real_time),
            )),
            teleop: Box::new(JoystickTeleop::new(
                params.behaviour.teleop.clone(),
                self.joystick(),
                elbow_config,
            )),
        };

        Ok(MotionSeq::new(
            params.motion_seq.clone(),
            geom,
            elbow_config,
            arm,
            self.delay(real_time),
            behaviours,
        ))
    }

    pub fn set_fault(&self, fault: SimFault) {
        self.world.borrow_mut().set_fault(fault)
    }

    pub fn clear_fault(&self, fault: SimFault) {
        self.world.borrow_mut().clear_fault(fault)
    }
}

#[cfg(test)]
pub(crate) fn test_params() -> SimParams {
    util::params::load_from_str(include_str!("../../../params/sim.toml")).unwrap()
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use arm_if::eqpt::*;

    use super::*;

    #[test]
    fn test_encoder_zero_at_power_up() -> Result<(), EqptError> {
        let sim = Sim::new(test_params()).unwrap();
        let mut eqpt = sim.joint_eqpt(JointId::Shoulder);

        assert_eq!(eqpt.encoder.angle_deg()?, 0.0);
        assert_eq!(
            sim.joint_angle_deg(JointId::Shoulder),
            test_params().shoulder.initial_angle_deg
        );

        eqpt.encoder.reset(45.0)?;
        assert_eq!(eqpt.encoder.angle_deg()?, 45.0);

        Ok(())
    }

    #[test]
    fn test_motor_moves_joint() -> Result<(), EqptError> {
        let sim = Sim::new(test_params()).unwrap();
        let mut eqpt = sim.joint_eqpt(JointId::Elbow);
        let mut delay = sim.delay(false);

        eqpt.motor.set_power(0.5)?;
        delay.delay(Duration::from_millis(500));

        assert!(eqpt.encoder.angle_deg()? > 1.0);
        assert!((sim.time_s() - 0.5).abs() < 1e-9);

        // Shoulder untouched
        assert_eq!(
            sim.joint_angle_deg(JointId::Shoulder),
            test_params().shoulder.initial_angle_deg
        );

        assert_eq!(
            eqpt.motor.set_power(1.5),
            Err(EqptError::InvalidDemand("elbow motor".into(), 1.5))
        );
        assert_eq!(sim.motor_power(JointId::Elbow), 0.5);

        Ok(())
    }

    #[test]
    fn test_limit_switch_at_stop() -> Result<(), EqptError> {
        let params = test_params();
        let sim = Sim::new(params.clone()).unwrap();
        let mut eqpt = sim.joint_eqpt(JointId::Shoulder);
        let mut delay = sim.delay(false);

        assert!(!eqpt.limit_switch.is_pressed()?);

        eqpt.motor.set_power(-1.0)?;
        delay.delay(Duration::from_secs(10));

        assert!(eqpt.limit_switch.is_pressed()?);
        assert_eq!(
            sim.joint_angle_deg(JointId::Shoulder),
            params.shoulder.min_angle_deg
        );

        Ok(())
    }

    #[test]
    fn test_fault_injection() {
        let sim = Sim::new(test_params()).unwrap();
        let mut eqpt = sim.joint_eqpt(JointId::Elbow);

        sim.set_fault(SimFault::Encoder(JointId::Elbow));
        assert_eq!(
            eqpt.encoder.angle_deg(),
            Err(EqptError::Unavailable("elbow encoder".into()))
        );
        assert!(sim.joint_eqpt(JointId::Shoulder).encoder.angle_deg().is_ok());

        sim.clear_fault(SimFault::Encoder(JointId::Elbow));
        assert!(eqpt.encoder.angle_deg().is_ok());
    }

    #[test]
    fn test_line_sensor() -> Result<(), EqptError> {
        let sim = Sim::new(test_params()).unwrap();
        let mut line = sim.line_sensor();

        assert!(matches!(line.read(), Err(EqptError::Unavailable(_))));

        line.calibrate()?;
        let reading = line.read()?;

        for c in reading.channels.iter() {
            assert!(*c >= 0.0 && *c <= 1.0);
        }
        assert!(reading.centre() > reading.left());

        Ok(())
    }

    #[test]
    fn test_line_ends() -> Result<(), EqptError> {
        let params = test_params();
        let sim = Sim::new(params.clone()).unwrap();
        let mut line = sim.line_sensor();
        let mut chassis = sim.chassis();
        let mut delay = sim.delay(false);

        line.calibrate()?;
        chassis.set(1.0, 0.0)?;
        assert_eq!(sim.chassis_demand(), (1.0, 0.0));

        let drive_time = 1.5 * params.line.length / params.line.max_speed;
        delay.delay(Duration::from_secs_f64(drive_time));

        assert!(sim.chassis_travelled() > params.line.length);
        assert!(!line.read()?.sees_line(0.01));

        assert!(chassis.set(0.0, -2.0).is_err());

        Ok(())
    }

    #[test]
    fn test_ultrasonic() -> Result<(), EqptError> {
        let params = test_params();
        let sim = Sim::new(params.clone()).unwrap();
        let mut us = sim.ultrasonic();
        let mut delay = sim.delay(false);

        let mut echoes = 0;
        let mut misses = 0;
        for _ in 0..200 {
            match us.range()? {
                Some(r) => {
                    assert!(r >= 0.0 && r <= params.ultrasonic.max_range);
                    echoes += 1;
                }
                None => misses += 1,
            }
            delay.delay(Duration::from_secs_f64(params.ultrasonic.period_s / 100.0));
        }

        assert!(echoes > 0);
        assert!(misses > 0);

        Ok(())
    }

    #[test]
    fn test_joystick_script() -> Result<(), EqptError> {
        let params = test_params();
        let sim = Sim::new(params.clone()).unwrap();
        let mut joystick = sim.joystick();

        let total_reads: u32 = params.joystick.script.iter().map(|s| s.reads).sum();

        let first = joystick.read()?;
        assert_eq!(first, params.joystick.script[0].state);

        for _ in 1..total_reads {
            joystick.read()?;
        }

        // Script exhausted
        assert!(joystick.read()?.exit);
        assert!(joystick.read()?.exit);

        Ok(())
    }

    #[test]
    fn test_full_sequence() {
        let params = crate::params::test_params();
        let sim = Sim::new(params.sim.clone()).unwrap();
        let mut seq = sim.motion_seq(&params, false).unwrap();

        let report = seq.run().unwrap();

        assert_eq!(report.completed_phases.len(), 12);
        assert_eq!(report.behaviours.len(), 3);
        assert_eq!(
            report.behaviours[1].exit,
            crate::behaviour::BehaviourExit::LineLost
        );
        assert_eq!(
            report.behaviours[2].exit,
            crate::behaviour::BehaviourExit::OperatorExit
        );

        // Every reachable sweep step ends close to its target
        let reached: Vec<_> = report.sweep.iter().filter(|r| r.reachable).collect();
        assert_eq!(reached.len(), 17);
        for r in reached {
            let dx = r.achieved_x.unwrap() - r.target_x;
            let dz = r.achieved_z.unwrap() - r.target_z;
            assert!((dx * dx + dz * dz).sqrt() < 0.5, "step {} off target", r.step);
        }

        assert_eq!(sim.motor_power(JointId::Shoulder), 0.0);
        assert_eq!(sim.chassis_demand(), (0.0, 0.0));
    }

    #[test]
    fn test_sequence_fault() {
        let params = crate::params::test_params();
        let sim = Sim::new(params.sim.clone()).unwrap();
        let mut seq = sim.motion_seq(&params, false).unwrap();

        sim.set_fault(SimFault::LimitSwitch(JointId::Elbow));
        let err = seq.run().unwrap_err();

        assert_eq!(err.phase(), crate::motion_seq::Phase::Home);
        assert_eq!(sim.motor_power(JointId::Shoulder), 0.0);
        assert_eq!(sim.motor_power(JointId::Elbow), 0.0);
    }

    #[test]
    fn test_invalid_params() {
        let mut params = test_params();
        params.integration_step_s = 0.0;
        assert!(Sim::new(params).is_err());

        let mut params = test_params();
        params.elbow.initial_angle_deg = params.elbow.max_angle_deg + 1.0;
        assert!(Sim::new(params).is_err());
    }
}
