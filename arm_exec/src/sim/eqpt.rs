//! Simulated equipment handles
//!
//! Each handle is a cheap clone of the shared world, so they can be handed
//! out to the driver and behaviours independently.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use arm_if::eqpt::*;

use super::SharedWorld;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated incremental encoder on one joint.
pub struct SimEncoder {
    pub(super) world: SharedWorld,
    pub(super) joint: JointId,
}

/// Simulated motor on one joint.
pub struct SimMotor {
    pub(super) world: SharedWorld,
    pub(super) joint: JointId,
}

/// Simulated home limit switch on one joint.
pub struct SimLimitSwitch {
    pub(super) world: SharedWorld,
    pub(super) joint: JointId,
}

pub struct SimUltrasonic {
    pub(super) world: SharedWorld,
}

pub struct SimLineSensor {
    pub(super) world: SharedWorld,
}

pub struct SimChassis {
    pub(super) world: SharedWorld,
}

pub struct SimJoystick {
    pub(super) world: SharedWorld,
}

/// Delay which advances the simulated world.
///
/// When `real_time` is set the delay also sleeps the thread, so the
/// simulation runs at wall clock speed.
pub struct SimDelay {
    pub(super) world: SharedWorld,
    pub(super) real_time: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointEncoder for SimEncoder {
    fn angle_deg(&mut self) -> Result<f64, EqptError> {
        self.world.borrow().encoder_angle_deg(self.joint)
    }

    fn reset(&mut self, angle_deg: f64) -> Result<(), EqptError> {
        self.world.borrow_mut().reset_encoder(self.joint, angle_deg)
    }
}

impl JointMotor for SimMotor {
    fn set_power(&mut self, power: f64) -> Result<(), EqptError> {
        self.world.borrow_mut().set_motor_power(self.joint, power)
    }
}

impl LimitSwitch for SimLimitSwitch {
    fn is_pressed(&mut self) -> Result<bool, EqptError> {
        self.world.borrow().limit_switch_pressed(self.joint)
    }
}

impl Ultrasonic for SimUltrasonic {
    fn range(&mut self) -> Result<Option<f64>, EqptError> {
        self.world.borrow().ultrasonic_range()
    }
}

impl LineSensor for SimLineSensor {
    fn calibrate(&mut self) -> Result<(), EqptError> {
        self.world.borrow_mut().calibrate_line()
    }

    fn read(&mut self) -> Result<LineReading, EqptError> {
        self.world.borrow().read_line()
    }
}

impl Chassis for SimChassis {
    fn set(&mut self, forward: f64, turn: f64) -> Result<(), EqptError> {
        self.world.borrow_mut().set_chassis(forward, turn)
    }
}

impl Joystick for SimJoystick {
    fn read(&mut self) -> Result<JoystickState, EqptError> {
        self.world.borrow_mut().read_joystick()
    }
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: Duration) {
        self.world.borrow_mut().advance(duration.as_secs_f64());

        if self.real_time {
            std::thread::sleep(duration);
        }
    }
}
