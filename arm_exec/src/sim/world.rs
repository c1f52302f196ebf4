//! Simulated world state and physics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashSet;
use std::f64::consts::TAU;

use arm_if::eqpt::{EqptError, JointId, JoystickState, LineReading, NUM_LINE_CHANNELS};
use util::maths::{clamp, lin_map};

use super::{SimError, SimFault, SimJointParams, SimParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The complete state of the simulation.
///
/// All equipment handles share one world, which only advances when a
/// simulated delay is performed.
#[derive(Debug)]
pub struct SimWorld {
    params: SimParams,

    /// Simulated time since the start.
    ///
    /// Units: seconds
    time_s: f64,

    joints: [SimJoint; 2],

    chassis: SimChassis,

    /// Calibrated raw background level of each line channel.
    line_cal: Option<[f64; NUM_LINE_CHANNELS]>,

    /// Position in the joystick script, as (step index, reads used in step).
    joystick_cursor: (usize, u32),

    faults: HashSet<SimFault>,
}

#[derive(Debug)]
struct SimJoint {
    params: SimJointParams,

    angle_deg: f64,

    rate_degs: f64,

    power: f64,

    /// True angle at which the encoder reads zero.
    encoder_offset_deg: f64,
}

#[derive(Debug, Default)]
struct SimChassis {
    forward: f64,

    turn: f64,

    travelled: f64,

    /// Lateral position of the line relative to the centre channel,
    /// positive to the right.
    line_offset: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        if !(params.integration_step_s > 0.0) {
            return Err(SimError::InvalidParams(format!(
                "integration_step_s must be positive, got {}",
                params.integration_step_s
            )));
        }

        for (id, p) in [(JointId::Shoulder, &params.shoulder), (JointId::Elbow, &params.elbow)]
            .iter()
        {
            if !(p.time_constant_s > 0.0)
                || !(p.min_angle_deg <= p.initial_angle_deg && p.initial_angle_deg <= p.max_angle_deg)
            {
                return Err(SimError::InvalidParams(format!(
                    "{} joint needs a positive time constant and an initial angle within its stops",
                    id
                )));
            }
        }

        let joint = |p: &SimJointParams| SimJoint {
            params: p.clone(),
            angle_deg: p.initial_angle_deg,
            rate_degs: 0.0,
            power: 0.0,
            encoder_offset_deg: p.initial_angle_deg,
        };

        Ok(Self {
            joints: [joint(&params.shoulder), joint(&params.elbow)],
            chassis: SimChassis {
                line_offset: params.line.initial_offset,
                ..Default::default()
            },
            params,
            time_s: 0.0,
            line_cal: None,
            joystick_cursor: (0, 0),
            faults: HashSet::new(),
        })
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn advance(&mut self, dt_s: f64) {
        if !(dt_s > 0.0) {
            return;
        }

        let num_steps = (dt_s / self.params.integration_step_s).ceil().max(1.0) as usize;
        let h = dt_s / num_steps as f64;

        for _ in 0..num_steps {
            for joint in self.joints.iter_mut() {
                joint.step(h);
            }
            self.step_chassis(h);
            self.time_s += h;
        }
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn set_fault(&mut self, fault: SimFault) {
        self.faults.insert(fault);
    }

    pub fn clear_fault(&mut self, fault: SimFault) {
        self.faults.remove(&fault);
    }

    // ---- JOINTS ----

    /// The true angle of the joint, independent of its encoder.
    pub fn joint_angle_deg(&self, joint: JointId) -> f64 {
        self.joints[joint.index()].angle_deg
    }

    pub fn motor_power(&self, joint: JointId) -> f64 {
        self.joints[joint.index()].power
    }

    pub fn encoder_angle_deg(&self, joint: JointId) -> Result<f64, EqptError> {
        self.check_fault(SimFault::Encoder(joint), || format!("{} encoder", joint))?;

        let j = &self.joints[joint.index()];
        Ok(j.angle_deg - j.encoder_offset_deg)
    }

    pub fn reset_encoder(&mut self, joint: JointId, angle_deg: f64) -> Result<(), EqptError> {
        self.check_fault(SimFault::Encoder(joint), || format!("{} encoder", joint))?;

        if !angle_deg.is_finite() {
            return Err(EqptError::InvalidDemand(format!("{} encoder", joint), angle_deg));
        }

        let j = &mut self.joints[joint.index()];
        j.encoder_offset_deg = j.angle_deg - angle_deg;
        Ok(())
    }

    pub fn set_motor_power(&mut self, joint: JointId, power: f64) -> Result<(), EqptError> {
        self.check_fault(SimFault::Motor(joint), || format!("{} motor", joint))?;

        if !(power >= -1.0 && power <= 1.0) {
            return Err(EqptError::InvalidDemand(format!("{} motor", joint), power));
        }

        self.joints[joint.index()].power = power;
        Ok(())
    }

    pub fn limit_switch_pressed(&self, joint: JointId) -> Result<bool, EqptError> {
        self.check_fault(SimFault::LimitSwitch(joint), || {
            format!("{} limit switch", joint)
        })?;

        let j = &self.joints[joint.index()];
        Ok(j.angle_deg <= j.params.switch_angle_deg)
    }

    // ---- SENSORS ----

    pub fn ultrasonic_range(&self) -> Result<Option<f64>, EqptError> {
        self.check_fault(SimFault::Ultrasonic, || "ultrasonic".into())?;

        let p = &self.params.ultrasonic;
        let phase = if p.period_s > 0.0 {
            TAU * self.time_s / p.period_s
        } else {
            0.0
        };
        let range = p.mean + p.amplitude * phase.sin();

        if range < 0.0 || range > p.max_range {
            Ok(None)
        } else {
            Ok(Some(range))
        }
    }

    /// Record the background level of each line channel.
    ///
    /// The simulated sensor measures its background from a dark reference
    /// rather than the track, so calibration always succeeds.
    pub fn calibrate_line(&mut self) -> Result<(), EqptError> {
        self.check_fault(SimFault::LineSensor, || "line sensor".into())?;

        self.line_cal = Some(self.params.line.raw_background);
        Ok(())
    }

    pub fn read_line(&self) -> Result<LineReading, EqptError> {
        self.check_fault(SimFault::LineSensor, || "line sensor".into())?;

        let cal = self
            .line_cal
            .ok_or_else(|| EqptError::Unavailable("line sensor (not calibrated)".into()))?;

        let p = &self.params.line;
        let mut reading = LineReading::default();

        for (i, channel) in reading.channels.iter_mut().enumerate() {
            let raw = p.raw_background[i] + (p.raw_line[i] - p.raw_background[i]) * self.reflectance(i);
            *channel = clamp(lin_map((cal[i], p.raw_line[i]), (0.0, 1.0), raw), 0.0, 1.0);
        }

        Ok(reading)
    }

    pub fn set_chassis(&mut self, forward: f64, turn: f64) -> Result<(), EqptError> {
        self.check_fault(SimFault::Chassis, || "chassis".into())?;

        for d in [forward, turn].iter() {
            if !(*d >= -1.0 && *d <= 1.0) {
                return Err(EqptError::InvalidDemand("chassis".into(), *d));
            }
        }

        self.chassis.forward = forward;
        self.chassis.turn = turn;
        Ok(())
    }

    /// Current chassis demand as (forward, turn).
    pub fn chassis_demand(&self) -> (f64, f64) {
        (self.chassis.forward, self.chassis.turn)
    }

    pub fn chassis_travelled(&self) -> f64 {
        self.chassis.travelled
    }

    pub fn read_joystick(&mut self) -> Result<JoystickState, EqptError> {
        self.check_fault(SimFault::Joystick, || "joystick".into())?;

        let script = &self.params.joystick.script;
        let (mut idx, mut used) = self.joystick_cursor;

        // Skip steps which have been fully read
        while idx < script.len() && used >= script[idx].reads {
            idx += 1;
            used = 0;
        }

        let state = match script.get(idx) {
            Some(step) => {
                used += 1;
                step.state
            }
            None => JoystickState {
                exit: true,
                ..Default::default()
            },
        };

        self.joystick_cursor = (idx, used);
        Ok(state)
    }

    // ---- PRIVATE ----

    fn check_fault<F>(&self, fault: SimFault, name: F) -> Result<(), EqptError>
    where
        F: FnOnce() -> String,
    {
        if self.faults.contains(&fault) {
            Err(EqptError::Unavailable(name()))
        } else {
            Ok(())
        }
    }

    /// Normalised reflectance seen by channel `i`, 1 over the line centre.
    fn reflectance(&self, i: usize) -> f64 {
        let p = &self.params.line;

        if self.chassis.travelled > p.length {
            return 0.0;
        }

        let pos = (i as f64 - 1.0) * p.channel_spacing;
        let u = (pos - self.chassis.line_offset) / p.line_width;
        (-u * u).exp()
    }

    fn step_chassis(&mut self, h: f64) {
        let p = &self.params.line;
        let ds = self.chassis.forward * p.max_speed * h;

        self.chassis.travelled += ds.abs();
        self.chassis.line_offset += (p.drift_per_distance - self.chassis.turn * p.turn_gain) * ds.abs();
    }
}

impl SimJoint {
    fn step(&mut self, h: f64) {
        let target_rate = self.power * self.params.max_rate_degs;
        let alpha = (h / self.params.time_constant_s).min(1.0);

        self.rate_degs += (target_rate - self.rate_degs) * alpha;
        self.angle_deg += self.rate_degs * h;

        // Hard stops
        if self.angle_deg < self.params.min_angle_deg {
            self.angle_deg = self.params.min_angle_deg;
            self.rate_degs = 0.0;
        }
        if self.angle_deg > self.params.max_angle_deg {
            self.angle_deg = self.params.max_angle_deg;
            self.rate_degs = 0.0;
        }
    }
}
