//! Recording arm used in tests of the arm's users

use super::*;

/// An arm which reaches every target instantly and records what it was
/// asked to do.
#[derive(Debug, Default)]
pub struct MockArm {
    pub angles: JointAngles,

    pub drives: Vec<JointAngles>,

    pub holds: Vec<Hold>,

    pub homed: bool,

    pub stops: u32,

    /// Fail every drive with an equipment error.
    pub fail_drives: bool,
}

impl MockArm {
    pub fn at(angles: JointAngles) -> Self {
        Self {
            angles,
            ..Default::default()
        }
    }
}

impl ArmActuation for MockArm {
    fn angles(&mut self) -> Result<JointAngles, ArmError> {
        Ok(self.angles)
    }

    fn stabilise(&mut self, hold: Hold) -> Result<(), ArmError> {
        self.holds.push(hold);
        Ok(())
    }

    fn home(&mut self) -> Result<(), ArmError> {
        self.homed = true;
        Ok(())
    }

    fn drive_to(&mut self, target: &JointAngles) -> Result<DriveReport, ArmError> {
        if self.fail_drives {
            return Err(ArmError::Eqpt {
                joint: JointId::Elbow,
                source: EqptError::Unavailable("elbow motor".into()),
            });
        }

        self.drives.push(*target);
        self.angles = *target;

        Ok(DriveReport {
            cycles: 1,
            final_angles: *target,
        })
    }

    fn stop(&mut self) -> Result<(), ArmError> {
        self.stops += 1;
        Ok(())
    }
}
