//! Parameters structures for the behaviours

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for all behaviours, as loaded from `behaviour.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviourParams {
    pub ultrasonic: UltrasonicFollowParams,

    pub line: LineFollowParams,

    pub teleop: TeleopParams,
}

/// Parameters for the ultrasonic follower.
#[derive(Debug, Clone, Deserialize)]
pub struct UltrasonicFollowParams {
    /// Number of ranging cycles to run.
    pub cycles: u32,

    /// Distance kept between the end effector and the target.
    pub standoff: f64,

    /// Fixed height of the end effector.
    pub z: f64,

    /// Closest horizontal reach demanded.
    pub min_reach: f64,

    /// Furthest horizontal reach demanded.
    pub max_reach_x: f64,
}

/// Parameters for the line follower.
#[derive(Debug, Clone, Deserialize)]
pub struct LineFollowParams {
    /// Chassis forward power while following.
    pub forward_power: f64,

    /// Turn demand per unit of right minus left reflectance.
    pub k_turn: f64,

    /// A channel above this reflectance sees the line.
    pub threshold: f64,

    /// Consecutive cycles without the line after which it is lost.
    pub lost_cycles: u32,

    pub max_cycles: u32,

    /// Units: seconds
    pub cycle_period_s: f64,
}

/// Parameters for joystick teleoperation.
#[derive(Debug, Clone, Deserialize)]
pub struct TeleopParams {
    /// Distance moved per cycle at full deflection.
    pub speed: f64,

    /// Axis deflections smaller than this are ignored.
    pub dead_band: f64,

    pub max_cycles: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file() {
        let params: BehaviourParams =
            util::params::load_from_str(include_str!("../../../params/behaviour.toml")).unwrap();

        assert!(params.ultrasonic.min_reach <= params.ultrasonic.max_reach_x);
        assert!(params.line.forward_power > 0.0 && params.line.forward_power <= 1.0);
        assert!(params.line.cycle_period_s > 0.0);
        assert!(params.teleop.dead_band < 1.0);
    }
}
