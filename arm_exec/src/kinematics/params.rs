//! Parameters structure for the kinematics model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{ArmGeometry, ElbowConfig, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the kinematics model.
#[derive(Debug, Clone, Deserialize)]
pub struct KinematicsParams {
    // ---- GEOMETRY ----

    /// Length of the first link, shoulder axis to elbow axis.
    pub l1: f64,

    /// Length of the second link, elbow axis to end effector.
    pub l2: f64,

    // ---- SOLVER ----

    /// Elbow configuration produced by inverse kinematics.
    #[serde(default)]
    pub elbow_config: ElbowConfig,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinematicsParams {
    /// Build the validated arm geometry described by these parameters.
    pub fn geometry(&self) -> Result<ArmGeometry, KinematicsError> {
        ArmGeometry::new(self.l1, self.l2)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_file() {
        let params: KinematicsParams =
            util::params::load_from_str(include_str!("../../../params/kinematics.toml")).unwrap();

        let geom = params.geometry().unwrap();
        assert!(geom.max_reach() > 0.0);
        assert_eq!(params.elbow_config, ElbowConfig::Upper);
    }

    #[test]
    fn test_elbow_config_default() {
        let params: KinematicsParams = util::params::load_from_str("l1 = 3.0\nl2 = 2.0\n").unwrap();
        assert_eq!(params.elbow_config, ElbowConfig::Upper);

        let params: KinematicsParams =
            util::params::load_from_str("l1 = 3.0\nl2 = 2.0\nelbow_config = \"lower\"\n").unwrap();
        assert_eq!(params.elbow_config, ElbowConfig::Lower);
    }
}
