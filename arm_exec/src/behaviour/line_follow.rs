//! Line follower behaviour
//!
//! Steers the chassis along a line using the three channel line sensor. The
//! arm itself is left where it is.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use std::time::Duration;

// Internal
use super::{Behaviour, BehaviourError, BehaviourExit, BehaviourReport, LineFollowParams};
use crate::arm_driver::ArmActuation;
use crate::kinematics::ArmGeometry;
use arm_if::eqpt::{Chassis, Delay, LineSensor};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct LineFollower<S, C, D> {
    params: LineFollowParams,

    sensor: S,

    chassis: C,

    delay: D,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<S, C, D> LineFollower<S, C, D>
where
    S: LineSensor,
    C: Chassis,
    D: Delay,
{
    pub fn new(params: LineFollowParams, sensor: S, chassis: C, delay: D) -> Self {
        Self {
            params,
            sensor,
            chassis,
            delay,
        }
    }

    fn report(&self, cycles: u32, exit: BehaviourExit) -> BehaviourReport {
        BehaviourReport {
            behaviour: self.name().into(),
            cycles,
            unreachable_targets: 0,
            exit,
        }
    }

    fn follow(&mut self) -> Result<BehaviourReport, BehaviourError> {
        let period = Duration::from_secs_f64(self.params.cycle_period_s);
        let mut lost_cycles = 0;

        for cycle in 1..=self.params.max_cycles {
            let reading = self.sensor.read()?;

            if reading.sees_line(self.params.threshold) {
                lost_cycles = 0;

                let turn = clamp(
                    self.params.k_turn * (reading.right() - reading.left()),
                    -1.0,
                    1.0,
                );
                trace!("Line {:?}, turn {:.3}", reading.channels, turn);

                self.chassis.set(self.params.forward_power, turn)?;
            } else {
                lost_cycles += 1;

                if lost_cycles >= self.params.lost_cycles {
                    info!("Line lost after {} cycles", cycle);
                    return Ok(self.report(cycle, BehaviourExit::LineLost));
                }

                self.chassis.set(self.params.forward_power, 0.0)?;
            }

            self.delay.delay(period);
        }

        debug!("Line follower reached its cycle limit");
        Ok(self.report(self.params.max_cycles, BehaviourExit::CycleLimit))
    }
}

impl<S, C, D> Behaviour for LineFollower<S, C, D>
where
    S: LineSensor,
    C: Chassis,
    D: Delay,
{
    fn name(&self) -> &'static str {
        "line_follow"
    }

    fn prepare(&mut self) -> Result<(), BehaviourError> {
        self.sensor.calibrate()?;
        info!("Line sensor calibrated");
        Ok(())
    }

    fn run(
        &mut self,
        _arm: &mut dyn ArmActuation,
        _geom: &ArmGeometry,
    ) -> Result<BehaviourReport, BehaviourError> {
        let result = self.follow();

        // The chassis is stopped however following ended
        let stopped = self.chassis.set(0.0, 0.0);

        let report = result?;
        stopped?;

        Ok(report)
    }
}
