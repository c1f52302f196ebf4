//! Parameters structure for the simulation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arm_if::eqpt::{JoystickState, NUM_LINE_CHANNELS};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated equipment.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Physics integration step. Delays longer than this are integrated in
    /// multiple steps.
    ///
    /// Units: seconds
    pub integration_step_s: f64,

    pub shoulder: SimJointParams,

    pub elbow: SimJointParams,

    pub ultrasonic: SimUltrasonicParams,

    pub line: SimLineParams,

    pub joystick: SimJoystickParams,
}

/// Parameters for one simulated joint.
#[derive(Debug, Clone, Deserialize)]
pub struct SimJointParams {
    /// True joint angle at the start of the simulation. The encoder reads
    /// zero here until it is reset.
    ///
    /// Units: degrees
    pub initial_angle_deg: f64,

    /// Joint rate at full motor power.
    ///
    /// Units: degrees/second
    pub max_rate_degs: f64,

    /// Time constant of the motor's response to a power change.
    ///
    /// Units: seconds
    pub time_constant_s: f64,

    /// Lower hard stop.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Upper hard stop.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    /// The limit switch is pressed at and below this angle.
    ///
    /// Units: degrees
    pub switch_angle_deg: f64,
}

/// Parameters for the simulated ultrasonic target.
///
/// The target's distance follows `mean + amplitude sin(2 pi t / period)`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimUltrasonicParams {
    pub mean: f64,

    pub amplitude: f64,

    /// Units: seconds
    pub period_s: f64,

    /// Beyond this range no echo is received.
    pub max_range: f64,
}

/// Parameters for the simulated line and chassis.
#[derive(Debug, Clone, Deserialize)]
pub struct SimLineParams {
    /// Raw output of each channel over the background.
    pub raw_background: [f64; NUM_LINE_CHANNELS],

    /// Raw output of each channel over the centre of the line.
    pub raw_line: [f64; NUM_LINE_CHANNELS],

    /// Lateral distance of the outer channels from the centre channel.
    pub channel_spacing: f64,

    /// Width scale of the line's reflectance profile.
    pub line_width: f64,

    /// Initial lateral offset of the line from the centre channel.
    pub initial_offset: f64,

    /// Rate at which the line drifts across the sensors while driving
    /// straight, per unit of distance travelled.
    pub drift_per_distance: f64,

    /// Chassis speed at full forward power.
    ///
    /// Units: distance/second
    pub max_speed: f64,

    /// Lateral correction per unit of distance travelled at full turn.
    pub turn_gain: f64,

    /// Distance after which the line ends.
    pub length: f64,
}

/// Parameters for the scripted joystick.
#[derive(Debug, Clone, Deserialize)]
pub struct SimJoystickParams {
    /// Steps played in order. Once the script is exhausted the joystick
    /// reports centred axes with the exit button held.
    #[serde(default)]
    pub script: Vec<SimJoystickStep>,
}

/// One step of the joystick script.
#[derive(Debug, Clone, Deserialize)]
pub struct SimJoystickStep {
    #[serde(flatten)]
    pub state: JoystickState,

    /// Number of reads this state is reported for.
    pub reads: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file() {
        let params: SimParams =
            util::params::load_from_str(include_str!("../../../params/sim.toml")).unwrap();

        assert!(params.integration_step_s > 0.0);
        assert!(params.shoulder.switch_angle_deg >= params.shoulder.min_angle_deg);
        assert!(params.elbow.switch_angle_deg >= params.elbow.min_angle_deg);
        assert!(!params.joystick.script.is_empty());
    }
}
