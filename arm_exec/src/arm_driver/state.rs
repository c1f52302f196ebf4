//! Implementation of the arm driver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use std::time::Duration;

// Internal
use super::{ArmActuation, ArmDriverParams, ArmError, DriveReport, Hold};
use crate::joint_ctrl::{InputData, JointCtrl};
use crate::kinematics::JointAngles;
use arm_if::eqpt::{Delay, JointEncoder, JointId, JointMotor, LimitSwitch};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The equipment attached to one joint.
pub struct JointEqpt<E, M, L> {
    pub encoder: E,
    pub motor: M,
    pub limit_switch: L,
}

/// Drives both joints of the arm using one position controller per joint.
///
/// Motors are left unpowered between operations.
pub struct ArmDriver<E, M, L, D> {
    params: ArmDriverParams,

    /// Joint equipment, indexed by [`JointId::index`].
    joints: [JointEqpt<E, M, L>; 2],

    /// Joint controllers, indexed by [`JointId::index`].
    ctrls: [JointCtrl; 2],

    delay: D,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<E, M, L, D> ArmDriver<E, M, L, D>
where
    E: JointEncoder,
    M: JointMotor,
    L: LimitSwitch,
    D: Delay,
{
    /// Create a new driver from the parameters and the joint equipment.
    pub fn new(
        params: ArmDriverParams,
        shoulder: JointEqpt<E, M, L>,
        elbow: JointEqpt<E, M, L>,
        delay: D,
    ) -> Result<Self, ArmError> {
        if !(params.cycle_period_s > 0.0) {
            return Err(ArmError::InvalidParams(format!(
                "cycle_period_s must be positive, got {}",
                params.cycle_period_s
            )));
        }
        if !(params.homing_power > 0.0 && params.homing_power <= 1.0) {
            return Err(ArmError::InvalidParams(format!(
                "homing_power must be in (0, 1], got {}",
                params.homing_power
            )));
        }

        let ctrls = [
            JointCtrl::new(params.shoulder.ctrl.clone())?,
            JointCtrl::new(params.elbow.ctrl.clone())?,
        ];

        Ok(Self {
            params,
            joints: [shoulder, elbow],
            ctrls,
            delay,
        })
    }

    fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(self.params.cycle_period_s)
    }

    fn home_deg(&self, joint: JointId) -> f64 {
        match joint {
            JointId::Shoulder => self.params.shoulder.home_deg,
            JointId::Elbow => self.params.elbow.home_deg,
        }
    }

    /// Read both encoders, indexed by joint.
    fn read_encoders(&mut self) -> Result<[f64; 2], ArmError> {
        let mut angles = [0f64; 2];

        for joint in JointId::ALL.iter() {
            angles[joint.index()] = self.joints[joint.index()]
                .encoder
                .angle_deg()
                .map_err(|source| ArmError::Eqpt {
                    joint: *joint,
                    source,
                })?;
        }

        trace!(
            "Encoders: shoulder {:.3} deg, elbow {:.3} deg",
            angles[0],
            angles[1]
        );

        Ok(angles)
    }

    fn set_power(&mut self, joint: JointId, power: f64) -> Result<(), ArmError> {
        self.joints[joint.index()]
            .motor
            .set_power(power)
            .map_err(|source| ArmError::Eqpt { joint, source })
    }

    fn reset_ctrls(&mut self) {
        for ctrl in self.ctrls.iter_mut() {
            ctrl.reset();
        }
    }

    /// Run one control cycle toward `target`.
    ///
    /// Returns the angles measured at the start of the cycle and whether both
    /// joints were on target.
    fn control_cycle(&mut self, target: &[f64; 2]) -> Result<([f64; 2], bool), ArmError> {
        let measured = self.read_encoders()?;
        let mut on_target = true;

        for joint in JointId::ALL.iter() {
            let i = joint.index();

            let (power, report) = self.ctrls[i].proc(&InputData {
                target_deg: target[i],
                measured_deg: measured[i],
                dt_s: self.params.cycle_period_s,
            })?;

            on_target &= report.on_target;
            self.set_power(*joint, power)?;
        }

        let period = self.cycle_period();
        self.delay.delay(period);

        Ok((measured, on_target))
    }

    fn hold_for(&mut self, cycles: u32) -> Result<(), ArmError> {
        let latch = self.read_encoders()?;
        self.reset_ctrls();

        for _ in 0..cycles {
            self.control_cycle(&latch)?;
        }

        self.stop()
    }

    fn hold_until_settled(&mut self) -> Result<(), ArmError> {
        let latch = self.read_encoders()?;
        self.reset_ctrls();

        let mut prev = latch;
        let mut still_cycles = 0;

        for cycle in 1..=self.params.max_settle_cycles {
            let (measured, _) = self.control_cycle(&latch)?;

            let still = measured.iter().zip(prev.iter()).all(|(m, p)| {
                ((m - p) / self.params.cycle_period_s).abs() < self.params.settle_rate_degs
            });
            prev = measured;

            if still {
                still_cycles += 1;
            } else {
                still_cycles = 0;
            }

            if still_cycles >= self.params.settle_cycles {
                debug!("Arm settled after {} cycles", cycle);
                return self.stop();
            }
        }

        self.stop()?;
        Err(ArmError::SettleTimeout(self.params.max_settle_cycles))
    }
}

impl<E, M, L, D> ArmActuation for ArmDriver<E, M, L, D>
where
    E: JointEncoder,
    M: JointMotor,
    L: LimitSwitch,
    D: Delay,
{
    fn angles(&mut self) -> Result<JointAngles, ArmError> {
        let angles = self.read_encoders()?;

        Ok(JointAngles {
            elbow_abs_deg: angles[JointId::Elbow.index()],
            shoulder_deg: angles[JointId::Shoulder.index()],
        })
    }

    fn stabilise(&mut self, hold: Hold) -> Result<(), ArmError> {
        match hold {
            Hold::UntilSettled => self.hold_until_settled(),
            Hold::Cycles(n) => self.hold_for(n),
        }
    }

    fn home(&mut self) -> Result<(), ArmError> {
        let mut homed = [false; 2];

        for _ in 0..self.params.max_homing_cycles {
            for joint in JointId::ALL.iter() {
                let i = joint.index();

                if homed[i] {
                    continue;
                }

                let pressed = self.joints[i]
                    .limit_switch
                    .is_pressed()
                    .map_err(|source| ArmError::Eqpt {
                        joint: *joint,
                        source,
                    })?;

                if pressed {
                    self.set_power(*joint, 0.0)?;

                    let home_deg = self.home_deg(*joint);
                    self.joints[i]
                        .encoder
                        .reset(home_deg)
                        .map_err(|source| ArmError::Eqpt {
                            joint: *joint,
                            source,
                        })?;

                    homed[i] = true;
                    info!("{} joint homed at {} deg", joint, home_deg);
                } else {
                    self.set_power(*joint, -self.params.homing_power)?;
                }
            }

            if homed.iter().all(|h| *h) {
                self.reset_ctrls();
                return Ok(());
            }

            let period = self.cycle_period();
            self.delay.delay(period);
        }

        self.stop()?;

        let joint = if !homed[JointId::Shoulder.index()] {
            JointId::Shoulder
        } else {
            JointId::Elbow
        };

        Err(ArmError::HomingTimeout {
            joint,
            cycles: self.params.max_homing_cycles,
        })
    }

    fn drive_to(&mut self, target: &JointAngles) -> Result<DriveReport, ArmError> {
        let mut demand = [0f64; 2];
        demand[JointId::Shoulder.index()] = target.shoulder_deg;
        demand[JointId::Elbow.index()] = target.elbow_abs_deg;

        self.reset_ctrls();

        let mut on_target_cycles = 0;

        for cycle in 1..=self.params.max_drive_cycles {
            let (_, on_target) = self.control_cycle(&demand)?;

            if on_target {
                on_target_cycles += 1;
            } else {
                on_target_cycles = 0;
            }

            if on_target_cycles >= self.params.on_target_cycles {
                self.stop()?;
                let final_angles = self.angles()?;

                debug!(
                    "Reached (elbow {:.2}, shoulder {:.2}) in {} cycles",
                    target.elbow_abs_deg, target.shoulder_deg, cycle
                );

                return Ok(DriveReport {
                    cycles: cycle,
                    final_angles,
                });
            }
        }

        self.stop()?;
        Err(ArmError::DriveTimeout {
            target: *target,
            cycles: self.params.max_drive_cycles,
        })
    }

    fn stop(&mut self) -> Result<(), ArmError> {
        for joint in JointId::ALL.iter() {
            self.set_power(*joint, 0.0)?;
        }
        Ok(())
    }
}
