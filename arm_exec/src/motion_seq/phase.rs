//! Sequencer phases

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::fmt::Display;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The operating phases of the sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Calibrate the behaviours' sensors.
    Calibrate,

    /// Hold until the arm is still, before homing.
    SettleInitial,

    /// Drive both joints onto their limit switches.
    Home,

    SettleHomed,

    /// Step the end effector up a vertical line, checking the kinematics at
    /// each step.
    Sweep,

    SettleSwept,

    UltrasonicFollow,

    PauseAfterUltrasonic,

    LineFollow,

    PauseAfterLine,

    Teleop,

    SettleFinal,

    /// Terminal phase, nothing is run.
    Complete,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Phase {
    /// Every phase, in the order they are run.
    pub const ALL: [Phase; 13] = [
        Phase::Calibrate,
        Phase::SettleInitial,
        Phase::Home,
        Phase::SettleHomed,
        Phase::Sweep,
        Phase::SettleSwept,
        Phase::UltrasonicFollow,
        Phase::PauseAfterUltrasonic,
        Phase::LineFollow,
        Phase::PauseAfterLine,
        Phase::Teleop,
        Phase::SettleFinal,
        Phase::Complete,
    ];

    /// The phase run after this one, `None` for [`Phase::Complete`].
    pub fn next(&self) -> Option<Phase> {
        use Phase::*;

        match self {
            Calibrate => Some(SettleInitial),
            SettleInitial => Some(Home),
            Home => Some(SettleHomed),
            SettleHomed => Some(Sweep),
            Sweep => Some(SettleSwept),
            SettleSwept => Some(UltrasonicFollow),
            UltrasonicFollow => Some(PauseAfterUltrasonic),
            PauseAfterUltrasonic => Some(LineFollow),
            LineFollow => Some(PauseAfterLine),
            PauseAfterLine => Some(Teleop),
            Teleop => Some(SettleFinal),
            SettleFinal => Some(Complete),
            Complete => None,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
