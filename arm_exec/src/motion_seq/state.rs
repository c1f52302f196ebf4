//! Implementation of the motion sequencer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use std::time::Duration;

// Internal
use super::{Phase, SeqError, SeqParams, SeqReport, SweepRecord};
use crate::arm_driver::{ArmActuation, ArmError, Hold};
use crate::behaviour::{Behaviour, BehaviourError};
use crate::kinematics::{ArmGeometry, ElbowConfig};
use arm_if::eqpt::Delay;
use util::archive::Archiver;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The behaviours run by the sequencer.
pub struct SeqBehaviours {
    pub ultrasonic: Box<dyn Behaviour>,
    pub line: Box<dyn Behaviour>,
    pub teleop: Box<dyn Behaviour>,
}

/// The motion sequencer.
pub struct MotionSeq<A, D> {
    params: SeqParams,

    geom: ArmGeometry,

    elbow_config: ElbowConfig,

    arm: A,

    /// Delay used for the pauses between behaviours.
    delay: D,

    behaviours: SeqBehaviours,

    /// Sweep record archive, if archiving is enabled.
    sweep_arch: Option<Archiver>,

    phase: Phase,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A, D> MotionSeq<A, D>
where
    A: ArmActuation,
    D: Delay,
{
    pub fn new(
        params: SeqParams,
        geom: ArmGeometry,
        elbow_config: ElbowConfig,
        arm: A,
        delay: D,
        behaviours: SeqBehaviours,
    ) -> Self {
        Self {
            params,
            geom,
            elbow_config,
            arm,
            delay,
            behaviours,
            sweep_arch: None,
            phase: Phase::Calibrate,
        }
    }

    /// Archive every sweep record with the given archiver.
    pub fn with_archiver(mut self, archiver: Archiver) -> Self {
        self.sweep_arch = Some(archiver);
        self
    }

    /// The phase currently running, or the last phase reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The arm driven by the sequencer.
    pub fn arm(&mut self) -> &mut A {
        &mut self.arm
    }

    /// Run the full sequence from [`Phase::Calibrate`].
    ///
    /// On failure the arm is stopped and the error names the failed phase.
    pub fn run(&mut self) -> Result<SeqReport, SeqError> {
        let mut report = SeqReport::default();
        self.phase = Phase::Calibrate;

        loop {
            let phase = self.phase;

            let next = match phase.next() {
                Some(p) => p,
                None => break,
            };

            info!("---- {} ----", phase);

            if let Err(e) = self.run_phase(phase, &mut report) {
                error!("Sequence aborted: {}", e);

                if let Err(stop_err) = self.arm.stop() {
                    error!("Could not stop the arm: {}", stop_err);
                }

                return Err(e);
            }

            report.completed_phases.push(phase);
            self.phase = next;
        }

        info!("Sequence complete");

        Ok(report)
    }

    fn run_phase(&mut self, phase: Phase, report: &mut SeqReport) -> Result<(), SeqError> {
        let arm_err = |source: ArmError| SeqError::Arm { phase, source };
        let behaviour_err = |source: BehaviourError| SeqError::Behaviour { phase, source };

        match phase {
            Phase::Calibrate => {
                self.behaviours.ultrasonic.prepare().map_err(behaviour_err)?;
                self.behaviours.line.prepare().map_err(behaviour_err)?;
                self.behaviours.teleop.prepare().map_err(behaviour_err)?;
            }
            Phase::SettleInitial | Phase::SettleHomed | Phase::SettleSwept | Phase::SettleFinal => {
                self.arm.stabilise(Hold::UntilSettled).map_err(arm_err)?
            }
            Phase::Home => self.arm.home().map_err(arm_err)?,
            Phase::Sweep => report.sweep = self.sweep().map_err(arm_err)?,
            Phase::UltrasonicFollow => report.behaviours.push(
                self.behaviours
                    .ultrasonic
                    .run(&mut self.arm, &self.geom)
                    .map_err(behaviour_err)?,
            ),
            Phase::LineFollow => report.behaviours.push(
                self.behaviours
                    .line
                    .run(&mut self.arm, &self.geom)
                    .map_err(behaviour_err)?,
            ),
            Phase::Teleop => report.behaviours.push(
                self.behaviours
                    .teleop
                    .run(&mut self.arm, &self.geom)
                    .map_err(behaviour_err)?,
            ),
            Phase::PauseAfterUltrasonic | Phase::PauseAfterLine => {
                self.delay.delay(Duration::from_millis(self.params.pause_ms))
            }
            Phase::Complete => (),
        }

        Ok(())
    }

    /// Step along the sweep line, checking the kinematics at each step.
    fn sweep(&mut self) -> Result<Vec<SweepRecord>, ArmError> {
        let params = self.params.sweep;
        let mut records = Vec::with_capacity(params.steps as usize);

        for (i, target) in params.targets(&self.geom).iter().enumerate() {
            let step = i as u32 + 1;

            let record = match self.geom.inverse(target, self.elbow_config) {
                Ok(angles) => {
                    let fk = self.geom.forward(&angles);
                    let diff = target.sub(&fk);

                    info!(
                        "Sweep {:2}: x {:.3}, x_calc {:.3}, diff {:.3e} | z {:.3}, z_calc {:.3}, diff {:.3e}",
                        step, target.x, fk.x, diff.x, target.z, fk.z, diff.z
                    );

                    let drive = self.arm.drive_to(&angles)?;
                    self.arm.stabilise(Hold::Cycles(params.settle_cycles))?;
                    let achieved = self.geom.forward(&self.arm.angles()?);

                    SweepRecord::reached(step, target, &angles, &fk, &achieved, drive.cycles)
                }
                Err(e) => {
                    warn!("Sweep {:2}: skipped, {}", step, e);
                    SweepRecord::unreachable(step, target)
                }
            };

            self.archive(&record);
            records.push(record);
        }

        Ok(records)
    }

    fn archive(&mut self, record: &SweepRecord) {
        if let Some(arch) = self.sweep_arch.as_mut() {
            if let Err(e) = arch.serialise(record) {
                warn!("Sweep archiving disabled: {}", e);
                self.sweep_arch = None;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::arm_driver::mock::MockArm;
    use crate::behaviour::{BehaviourExit, BehaviourReport};
    use crate::kinematics::CartesianPos;
    use crate::motion_seq::SweepParams;
    use arm_if::eqpt::EqptError;

    type Log = Rc<RefCell<Vec<String>>>;

    struct StubBehaviour {
        name: &'static str,
        log: Log,
        fail: bool,
    }

    impl Behaviour for StubBehaviour {
        fn name(&self) -> &'static str {
            self.name
        }

        fn prepare(&mut self) -> Result<(), BehaviourError> {
            self.log.borrow_mut().push(format!("prepare {}", self.name));
            Ok(())
        }

        fn run(
            &mut self,
            _arm: &mut dyn ArmActuation,
            _geom: &ArmGeometry,
        ) -> Result<BehaviourReport, BehaviourError> {
            self.log.borrow_mut().push(format!("run {}", self.name));

            if self.fail {
                return Err(BehaviourError::Eqpt(EqptError::Unavailable(
                    "line sensor".into(),
                )));
            }

            Ok(BehaviourReport {
                behaviour: self.name.into(),
                cycles: 1,
                unreachable_targets: 0,
                exit: BehaviourExit::Completed,
            })
        }
    }

    #[derive(Default)]
    struct RecordingDelay(Vec<Duration>);

    impl Delay for RecordingDelay {
        fn delay(&mut self, duration: Duration) {
            self.0.push(duration)
        }
    }

    fn params() -> SeqParams {
        SeqParams {
            pause_ms: 1000,
            sweep: SweepParams {
                x: None,
                z_start: None,
                z_step: 1.0,
                steps: 24,
                settle_cycles: 2,
            },
        }
    }

    fn behaviours(log: &Log, failing: Option<&'static str>) -> SeqBehaviours {
        let stub = |name: &'static str| -> Box<dyn Behaviour> {
            Box::new(StubBehaviour {
                name,
                log: log.clone(),
                fail: failing == Some(name),
            })
        };

        SeqBehaviours {
            ultrasonic: stub("ultrasonic"),
            line: stub("line"),
            teleop: stub("teleop"),
        }
    }

    fn seq<'a>(
        arm: &'a mut MockArm,
        delay: &'a mut RecordingDelay,
        log: &Log,
        failing: Option<&'static str>,
    ) -> MotionSeq<&'a mut MockArm, &'a mut RecordingDelay> {
        MotionSeq::new(
            params(),
            ArmGeometry::new(10.0, 10.0).unwrap(),
            ElbowConfig::Upper,
            arm,
            delay,
            behaviours(log, failing),
        )
    }

    #[test]
    fn test_phase_order() -> Result<(), SeqError> {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let report = seq(&mut arm, &mut delay, &log, None).run()?;

        assert_eq!(report.completed_phases, Phase::ALL[..Phase::ALL.len() - 1].to_vec());
        assert_eq!(
            *log.borrow(),
            vec![
                "prepare ultrasonic",
                "prepare line",
                "prepare teleop",
                "run ultrasonic",
                "run line",
                "run teleop"
            ]
        );
        assert_eq!(report.behaviours.len(), 3);
        assert!(arm.homed);
        assert_eq!(arm.stops, 0);

        // z = 1 to 17 are within reach of a 10 + 10 arm at x = 10
        assert_eq!(report.sweep.len(), 24);
        assert_eq!(report.sweep.iter().filter(|r| r.reachable).count(), 17);
        assert_eq!(arm.drives.len(), 17);

        let mut expected_holds = vec![Hold::UntilSettled; 2];
        expected_holds.extend(vec![Hold::Cycles(2); 17]);
        expected_holds.extend(vec![Hold::UntilSettled; 2]);
        assert_eq!(arm.holds, expected_holds);

        assert_eq!(delay.0, vec![Duration::from_millis(1000); 2]);

        Ok(())
    }

    #[test]
    fn test_sweep_records() -> Result<(), SeqError> {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let report = seq(&mut arm, &mut delay, &log, None).run()?;

        for record in report.sweep.iter() {
            assert_eq!(record.target_x, 10.0);
            assert_eq!(record.target_z, record.step as f64);

            if record.reachable {
                assert!(record.diff_x.unwrap().abs() < 1e-9);
                assert!(record.diff_z.unwrap().abs() < 1e-9);
                assert!((record.achieved_z.unwrap() - record.target_z).abs() < 1e-9);
            } else {
                assert!(record.step >= 18);
                assert!(record.elbow_abs_deg.is_none());
            }
        }

        Ok(())
    }

    #[test]
    fn test_restarts_from_calibrate() -> Result<(), SeqError> {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let mut seq = seq(&mut arm, &mut delay, &log, None);
        let first = seq.run()?;
        assert_eq!(seq.phase(), Phase::Complete);

        let second = seq.run()?;
        assert_eq!(first.completed_phases, second.completed_phases);
        assert_eq!(log.borrow().len(), 12);

        Ok(())
    }

    #[test]
    fn test_arm_failure_aborts() {
        let mut arm = MockArm {
            fail_drives: true,
            ..Default::default()
        };
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let err = seq(&mut arm, &mut delay, &log, None).run().unwrap_err();

        assert!(matches!(
            err,
            SeqError::Arm {
                phase: Phase::Sweep,
                ..
            }
        ));
        assert_eq!(err.phase(), Phase::Sweep);
        assert_eq!(arm.stops, 1);
        assert!(!log.borrow().iter().any(|l| l.starts_with("run")));
        assert!(delay.0.is_empty());
    }

    #[test]
    fn test_behaviour_failure_aborts() {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let err = seq(&mut arm, &mut delay, &log, Some("line")).run().unwrap_err();

        assert_eq!(err.phase(), Phase::LineFollow);
        assert_eq!(arm.stops, 1);
        assert_eq!(log.borrow().last().map(String::as_str), Some("run line"));
        assert_eq!(delay.0.len(), 1);
    }

    #[test]
    fn test_unreachable_sweep_not_actuated() -> Result<(), SeqError> {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let mut p = params();
        p.sweep.x = Some(25.0);
        let mut seq = MotionSeq::new(
            p,
            ArmGeometry::new(10.0, 10.0).unwrap(),
            ElbowConfig::Upper,
            &mut arm,
            &mut delay,
            behaviours(&log, None),
        );

        let report = seq.run()?;
        assert!(report.sweep.iter().all(|r| !r.reachable));
        assert!(arm.drives.is_empty());
        assert_eq!(arm.holds, vec![Hold::UntilSettled; 4]);

        Ok(())
    }

    #[test]
    fn test_archive_and_report() -> Result<(), SeqError> {
        let mut arm = MockArm::default();
        let mut delay = RecordingDelay::default();
        let log = Log::default();

        let path = std::env::temp_dir()
            .join(format!("motion_seq_test_{}", std::process::id()))
            .join("sweep.csv");

        let report = seq(&mut arm, &mut delay, &log, None)
            .with_archiver(Archiver::from_file_path(&path).unwrap())
            .run()?;

        let csv = std::fs::read_to_string(&path).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("step,target_x,target_z,reachable"));
        assert_eq!(lines.count(), 24);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"completed_phases\""));
        assert!(json.contains("\"SettleFinal\""));

        // Unreachable steps leave their optional fields empty
        let target = CartesianPos::new(10.0, 24.0);
        assert_eq!(report.sweep[23].target_z, target.z);
        assert!(csv.lines().last().unwrap().ends_with(",false,,,,,,,,,"));

        Ok(())
    }
}
