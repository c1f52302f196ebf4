//! Implementations for the JointCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{JointCtrlError, JointCtrlParams, PidController};
use util::{maths::clamp, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint control module state
#[derive(Default)]
pub struct JointCtrl {
    pub(crate) params: Option<JointCtrlParams>,

    pub(crate) pid: Option<PidController>,

    pub(crate) report: StatusReport,
}

/// Input data to Joint Control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Angle the joint should be at.
    ///
    /// Units: degrees
    pub target_deg: f64,

    /// Angle the joint is currently at.
    ///
    /// Units: degrees
    pub measured_deg: f64,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for JointCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Target minus measured angle.
    ///
    /// Units: degrees
    pub error_deg: f64,

    /// The power demand was limited to the maximum power.
    pub power_saturated: bool,

    /// The error is within the on target tolerance.
    pub on_target: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for JointCtrl {
    type InitData = JointCtrlParams;
    type InitError = JointCtrlError;

    type InputData = InputData;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = JointCtrlError;

    /// Initialise the JointCtrl module.
    ///
    /// Expected init data is the controller parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;

        self.pid = Some(PidController::new(
            init_data.k_p,
            init_data.k_i,
            init_data.k_d,
            init_data.integral_limit,
        ));
        self.params = Some(init_data);
        self.report = StatusReport::default();

        Ok(())
    }

    /// Perform cyclic processing of Joint Control.
    ///
    /// The output is the motor power demand, within `[-max_power, max_power]`.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let (params, pid) = match (&self.params, &mut self.pid) {
            (Some(params), Some(pid)) => (params, pid),
            _ => return Err(JointCtrlError::NotInitialised),
        };

        let InputData {
            target_deg,
            measured_deg,
            dt_s,
        } = *input_data;

        if !(target_deg.is_finite() && measured_deg.is_finite() && dt_s.is_finite()) {
            return Err(JointCtrlError::NonFiniteInput {
                target_deg,
                measured_deg,
                dt_s,
            });
        }

        let error_deg = target_deg - measured_deg;
        let raw_power = pid.get(error_deg, dt_s);
        let power = clamp(raw_power, -params.max_power, params.max_power);

        self.report = StatusReport {
            error_deg,
            power_saturated: power != raw_power,
            on_target: error_deg.abs() <= params.on_target_tol_deg,
        };

        trace!(
            "JointCtrl error {:.3} deg, power {:.3} (raw {:.3})",
            error_deg,
            power,
            raw_power
        );

        Ok((power, self.report))
    }
}

impl JointCtrl {
    /// Create and initialise a new controller.
    pub fn new(params: JointCtrlParams) -> Result<Self, JointCtrlError> {
        let mut ctrl = Self::default();
        ctrl.init(params)?;
        Ok(ctrl)
    }

    /// Clear the controller history, used whenever the target changes
    /// discontinuously.
    pub fn reset(&mut self) {
        if let Some(pid) = self.pid.as_mut() {
            pid.reset();
        }
        self.report = StatusReport::default();
    }

    /// The report from the last processing cycle.
    pub fn report(&self) -> StatusReport {
        self.report
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> JointCtrlParams {
        JointCtrlParams {
            k_p: 0.1,
            k_i: 0.0,
            k_d: 0.0,
            integral_limit: 10.0,
            max_power: 0.8,
            on_target_tol_deg: 0.5,
        }
    }

    #[test]
    fn test_not_initialised() {
        let mut ctrl = JointCtrl::default();
        assert_eq!(
            ctrl.proc(&InputData::default()).unwrap_err(),
            JointCtrlError::NotInitialised
        );
    }

    #[test]
    fn test_invalid_params() {
        let mut p = params();
        p.max_power = 1.5;
        assert!(matches!(
            JointCtrl::new(p),
            Err(JointCtrlError::InvalidParams(_))
        ));

        let mut p = params();
        p.k_d = -1.0;
        assert!(JointCtrl::new(p).is_err());
    }

    #[test]
    fn test_saturation_and_on_target() -> Result<(), JointCtrlError> {
        let mut ctrl = JointCtrl::new(params())?;

        let (power, report) = ctrl.proc(&InputData {
            target_deg: 90.0,
            measured_deg: 0.0,
            dt_s: 0.02,
        })?;
        assert_eq!(power, 0.8);
        assert!(report.power_saturated);
        assert!(!report.on_target);

        let (power, report) = ctrl.proc(&InputData {
            target_deg: 0.0,
            measured_deg: 0.3,
            dt_s: 0.02,
        })?;
        assert!((power + 0.03).abs() < 1e-12);
        assert!(!report.power_saturated);
        assert!(report.on_target);

        Ok(())
    }

    #[test]
    fn test_non_finite_input() -> Result<(), JointCtrlError> {
        let mut ctrl = JointCtrl::new(params())?;

        assert!(matches!(
            ctrl.proc(&InputData {
                target_deg: f64::NAN,
                measured_deg: 0.0,
                dt_s: 0.02,
            }),
            Err(JointCtrlError::NonFiniteInput { .. })
        ));

        Ok(())
    }
}
