//! The actuator record and its lifecycle operations.
//!
//! `ActuatorController` owns the lifecycle state, the drive adapter and
//! the sensor front end. Every operation validates against the
//! lifecycle before touching hardware, so a rejected command has no
//! side effects and the state stays retryable.

use crate::lifecycle::{ActuatorLifecycle, LifecycleEvent, TransitionResult};
use romi_common::config::ControllerConfig;
use romi_common::consts::{ERR_BAD_STATE, ERR_DRIVE, ERR_NOT_IMPLEMENTED, ERR_OUT_OF_RANGE};
use romi_common::drive::{DriveAdapter, DriveError};
use romi_common::sensor::{AngleSample, QuadratureSensor};
use romi_common::state::LifecycleState;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors reported by controller operations. The command layer renders
/// them as coded wire replies; nothing here panics.
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    /// Operation not permitted in the current lifecycle state.
    #[error("Bad state")]
    BadState,

    /// Recognized operation this firmware does not support.
    #[error("Not implemented")]
    NotImplemented,

    /// Numeric argument outside the encodable range.
    #[error("Out of range")]
    Overflow,

    /// Drive adapter failure.
    #[error(transparent)]
    Drive(#[from] DriveError),
}

impl ControlError {
    /// Wire error code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::BadState => ERR_BAD_STATE,
            Self::NotImplemented => ERR_NOT_IMPLEMENTED,
            Self::Overflow => ERR_OUT_OF_RANGE,
            Self::Drive(_) => ERR_DRIVE,
        }
    }
}

/// The single actuator record: lifecycle, drive handle and the most
/// recent position sample. Created once at process start.
pub struct ActuatorController {
    lifecycle: ActuatorLifecycle,
    drive: Box<dyn DriveAdapter>,
    sensor: QuadratureSensor,
    config: ControllerConfig,
    last_sample: AngleSample,
    target: f64,
    started: Instant,
    last_tick: Option<Instant>,
}

impl ActuatorController {
    /// Build the record around a drive adapter. The lifecycle starts in
    /// Created; nothing is touched until `setup()`.
    pub fn new(config: ControllerConfig, drive: Box<dyn DriveAdapter>) -> Self {
        let sensor = QuadratureSensor::new(config.sensor.clone());
        info!(drive = drive.name(), version = drive.version(), "controller created");
        Self {
            lifecycle: ActuatorLifecycle::new(),
            drive,
            sensor,
            config,
            last_sample: AngleSample::default(),
            target: 0.0,
            started: Instant::now(),
            last_tick: None,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Position target [rad].
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Bind the sensor interrupts and claim the power-stage pins.
    pub fn setup(&mut self) -> Result<(), ControlError> {
        if !self.lifecycle.permits(LifecycleEvent::Setup) {
            return Err(ControlError::BadState);
        }
        self.sensor.init();
        self.sensor.enable_interrupts();
        self.drive.link_sensor(self.sensor.feedback());
        self.drive.link_driver(&self.config.power_stage)?;
        self.commit(LifecycleEvent::Setup);
        info!("actuator set up");
        Ok(())
    }

    /// Apply tuning constants and initialize the drive. The drive stays
    /// disabled.
    pub fn configure(&mut self) -> Result<(), ControlError> {
        if !self.lifecycle.permits(LifecycleEvent::Configure) {
            return Err(ControlError::BadState);
        }
        self.drive.init(&self.config.motor)?;
        self.commit(LifecycleEvent::Configure);
        info!("actuator configured");
        Ok(())
    }

    /// Run the drive origin-alignment procedure.
    pub fn calibrate(&mut self) -> Result<(), ControlError> {
        if !self.lifecycle.permits(LifecycleEvent::Calibrate) {
            return Err(ControlError::BadState);
        }
        if !self.drive.calibrate_origin() {
            warn!("origin alignment failed");
            return Err(ControlError::BadState);
        }
        self.commit(LifecycleEvent::Calibrate);
        info!("actuator calibrated");
        Ok(())
    }

    /// Enable the power stage. Pending motion is stopped first so the
    /// shaft cannot jump on power-up.
    pub fn enable(&mut self) -> Result<(), ControlError> {
        if !self.lifecycle.permits(LifecycleEvent::Enable) {
            return Err(ControlError::BadState);
        }
        self.stop();
        self.drive.enable();
        self.commit(LifecycleEvent::Enable);
        info!("actuator enabled");
        Ok(())
    }

    /// Disable the power stage. Accepted in every state; from any
    /// non-Enabled state this is a successful no-op.
    pub fn disable(&mut self) -> Result<(), ControlError> {
        self.stop();
        if self.lifecycle.is_enabled() {
            self.drive.disable();
            info!("actuator disabled");
        }
        self.commit(LifecycleEvent::Disable);
        Ok(())
    }

    /// One control cycle. Only does work while Enabled: samples the
    /// sensor, polls the fault word and runs one drive step. Returns
    /// whether work was performed.
    pub fn update(&mut self) -> bool {
        if !self.lifecycle.is_enabled() {
            self.last_tick = None;
            return false;
        }

        let now = Instant::now();
        self.last_sample = self.sensor.sample(self.elapsed_ms(now));

        let faults = self.drive.faults();
        if faults.has_critical() {
            warn!(?faults, "critical drive fault, disabling");
            self.drive.disable();
            self.lifecycle.latch_error();
            self.last_tick = None;
            return true;
        }

        let dt = match self.last_tick {
            Some(prev) => now.duration_since(prev),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        self.drive.step(dt);
        true
    }

    /// Queue a new position target [rad]. Accepted in any state; acted
    /// on only while Enabled.
    pub fn moveto(&mut self, angle: f64) {
        self.target = angle;
        self.drive.set_target(angle);
        debug!(angle, "target updated");
    }

    /// Most recent position sample. Never blocks; zero angle and
    /// timestamp 0 before the first enabled cycle.
    #[inline]
    pub fn get_position(&self) -> AngleSample {
        self.last_sample
    }

    /// Halt by re-targeting the last sampled angle (zero before the
    /// first sample).
    pub fn stop(&mut self) {
        self.target = self.last_sample.radians;
        self.drive.set_target(self.target);
        debug!(hold = self.target, "motion stopped");
    }

    fn commit(&mut self, event: LifecycleEvent) {
        match self.lifecycle.handle_event(event) {
            TransitionResult::Ok(state) => debug!(?state, ?event, "lifecycle transition"),
            TransitionResult::Rejected(reason) => {
                warn!(reason, ?event, "guarded transition rejected")
            }
        }
    }

    /// Milliseconds since construction. The wire field is u32, so the
    /// clock wraps after about 49 days.
    fn elapsed_ms(&self, now: Instant) -> u32 {
        now.duration_since(self.started).as_millis() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romi_common::config::{MotorConfig, PowerStageConfig};
    use romi_common::drive::DriveFault;
    use romi_common::sensor::FeedbackHandle;
    use std::sync::{Arc, Mutex};

    /// Scripted drive recording every call for inspection.
    #[derive(Default)]
    struct DriveLog {
        enabled: bool,
        init_calls: u32,
        calibrate_calls: u32,
        steps: u32,
        last_target: Option<f64>,
        calibrate_ok: bool,
        faults: DriveFault,
    }

    struct ScriptedDrive {
        log: Arc<Mutex<DriveLog>>,
    }

    impl DriveAdapter for ScriptedDrive {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn version(&self) -> &'static str {
            "0.0.0"
        }

        fn link_sensor(&mut self, _feedback: FeedbackHandle) {}

        fn link_driver(&mut self, _pins: &PowerStageConfig) -> Result<(), DriveError> {
            Ok(())
        }

        fn init(&mut self, _tuning: &MotorConfig) -> Result<(), DriveError> {
            self.log.lock().unwrap().init_calls += 1;
            Ok(())
        }

        fn calibrate_origin(&mut self) -> bool {
            let mut log = self.log.lock().unwrap();
            log.calibrate_calls += 1;
            log.calibrate_ok
        }

        fn enable(&mut self) {
            self.log.lock().unwrap().enabled = true;
        }

        fn disable(&mut self) {
            self.log.lock().unwrap().enabled = false;
        }

        fn set_target(&mut self, angle: f64) {
            self.log.lock().unwrap().last_target = Some(angle);
        }

        fn step(&mut self, _dt: Duration) {
            self.log.lock().unwrap().steps += 1;
        }

        fn faults(&self) -> DriveFault {
            self.log.lock().unwrap().faults
        }
    }

    fn controller() -> (ActuatorController, Arc<Mutex<DriveLog>>) {
        let log = Arc::new(Mutex::new(DriveLog {
            calibrate_ok: true,
            ..DriveLog::default()
        }));
        let drive = ScriptedDrive {
            log: Arc::clone(&log),
        };
        (
            ActuatorController::new(ControllerConfig::default(), Box::new(drive)),
            log,
        )
    }

    fn enabled_controller() -> (ActuatorController, Arc<Mutex<DriveLog>>) {
        let (mut c, log) = controller();
        c.setup().unwrap();
        c.configure().unwrap();
        c.calibrate().unwrap();
        c.enable().unwrap();
        (c, log)
    }

    #[test]
    fn bringup_happy_path() {
        let (mut c, log) = controller();
        assert_eq!(c.state(), LifecycleState::Created);

        c.setup().unwrap();
        assert_eq!(c.state(), LifecycleState::SetUp);

        c.configure().unwrap();
        assert_eq!(c.state(), LifecycleState::Configured);
        assert_eq!(log.lock().unwrap().init_calls, 1);

        c.calibrate().unwrap();
        assert_eq!(c.state(), LifecycleState::Calibrated);

        c.enable().unwrap();
        assert_eq!(c.state(), LifecycleState::Enabled);
        assert!(log.lock().unwrap().enabled);
    }

    #[test]
    fn reordered_operations_have_no_side_effects() {
        let (mut c, log) = controller();

        assert!(matches!(c.configure(), Err(ControlError::BadState)));
        assert_eq!(c.state(), LifecycleState::Created);
        assert_eq!(log.lock().unwrap().init_calls, 0);

        assert!(matches!(c.calibrate(), Err(ControlError::BadState)));
        assert_eq!(log.lock().unwrap().calibrate_calls, 0);

        assert!(matches!(c.enable(), Err(ControlError::BadState)));
        assert!(!log.lock().unwrap().enabled);
        assert_eq!(c.state(), LifecycleState::Created);
    }

    #[test]
    fn failed_alignment_keeps_state() {
        let (mut c, log) = controller();
        log.lock().unwrap().calibrate_ok = false;
        c.setup().unwrap();
        c.configure().unwrap();

        assert!(matches!(c.calibrate(), Err(ControlError::BadState)));
        assert_eq!(c.state(), LifecycleState::Configured);
        assert_eq!(log.lock().unwrap().calibrate_calls, 1);

        // Retry after the fault clears.
        log.lock().unwrap().calibrate_ok = true;
        c.calibrate().unwrap();
        assert_eq!(c.state(), LifecycleState::Calibrated);
    }

    #[test]
    fn disable_is_always_ok() {
        let (mut c, _log) = controller();
        c.disable().unwrap();
        assert_eq!(c.state(), LifecycleState::Created);

        let (mut c, log) = enabled_controller();
        c.disable().unwrap();
        assert_eq!(c.state(), LifecycleState::Disabled);
        assert!(!log.lock().unwrap().enabled);

        c.enable().unwrap();
        assert_eq!(c.state(), LifecycleState::Enabled);
    }

    #[test]
    fn update_is_noop_until_enabled() {
        let (mut c, log) = controller();
        assert!(!c.update());
        c.setup().unwrap();
        c.configure().unwrap();
        c.calibrate().unwrap();
        assert!(!c.update());
        assert_eq!(log.lock().unwrap().steps, 0);

        c.enable().unwrap();
        assert!(c.update());
        assert_eq!(log.lock().unwrap().steps, 1);
    }

    #[test]
    fn critical_fault_latches_error() {
        let (mut c, log) = enabled_controller();
        log.lock().unwrap().faults = DriveFault::OVER_CURRENT;

        assert!(c.update());
        assert_eq!(c.state(), LifecycleState::Error);
        assert!(!log.lock().unwrap().enabled);

        // Latched: no further work, commanded events rejected.
        assert!(!c.update());
        assert!(matches!(c.enable(), Err(ControlError::BadState)));
        c.disable().unwrap();
        assert_eq!(c.state(), LifecycleState::Error);
    }

    #[test]
    fn non_critical_fault_keeps_running() {
        let (mut c, log) = enabled_controller();
        log.lock().unwrap().faults = DriveFault::UNDER_VOLTAGE;

        assert!(c.update());
        assert_eq!(c.state(), LifecycleState::Enabled);
        assert_eq!(log.lock().unwrap().steps, 1);
    }

    #[test]
    fn moveto_accepted_in_any_state() {
        let (mut c, log) = controller();
        c.moveto(-1.2);
        assert_eq!(c.target(), -1.2);
        assert_eq!(log.lock().unwrap().last_target, Some(-1.2));

        let (mut c, log) = enabled_controller();
        c.moveto(3.5);
        assert_eq!(log.lock().unwrap().last_target, Some(3.5));
    }

    #[test]
    fn enable_stops_pending_motion() {
        let (mut c, log) = controller();
        c.setup().unwrap();
        c.configure().unwrap();
        c.calibrate().unwrap();
        c.moveto(5.0);

        c.enable().unwrap();
        // No sample taken yet, so the hold target is zero.
        assert_eq!(c.target(), 0.0);
        assert_eq!(log.lock().unwrap().last_target, Some(0.0));
    }

    #[test]
    fn position_is_sentinel_before_first_cycle() {
        let (c, _log) = controller();
        let sample = c.get_position();
        assert_eq!(sample.radians, 0.0);
        assert_eq!(sample.timestamp, 0);
    }

    #[test]
    fn error_codes_match_the_wire() {
        assert_eq!(ControlError::BadState.code(), 1);
        assert_eq!(ControlError::NotImplemented.code(), 2);
        assert_eq!(ControlError::Overflow.code(), 3);
        let drive_err: ControlError = DriveError::InitFailed("x".to_string()).into();
        assert_eq!(drive_err.code(), 4);
    }

    #[test]
    fn error_messages_match_the_wire() {
        assert_eq!(ControlError::BadState.to_string(), "Bad state");
        assert_eq!(ControlError::NotImplemented.to_string(), "Not implemented");
    }
}
