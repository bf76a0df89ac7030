//! Orientation fusion engine.
//!
//! Pure computation layer: takes raw sensor samples in, produces
//! [`OrientationState`] snapshots and observer notifications out. No async
//! code lives here; the service layer owns channels and scheduling.
//!
//! Data flow per sample: axis remap for display rotation, tilt-compensated
//! magnetic heading (or a direct orientation reading), Kalman predict/correct,
//! motion-adaptive smoothing, declination and calibration offset, publish.

use std::fmt;

use log::{debug, info, warn};
use nalgebra::Vector3;

use crate::angle;
use crate::calibration_prompt::{CalibrationPromptController, PromptEvent};
use crate::config::EngineConfig;
use crate::declination::DeclinationCache;
use crate::heading_filter::HeadingFusionFilter;
use crate::interference::InterferenceDetector;
use crate::motion::AdaptiveMotionFilter;
use crate::types::{
    AccelSample, CompassStatus, DisplayRotation, GyroSample, HeadingSample, LocationFix,
    MagAccuracy, MagSample, OrientationState,
};

/// Chosen once at start from the sensor inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FusionMode {
    /// Platform provides a fused orientation sensor; its heading readings are
    /// the measurement source.
    DirectOrientation,
    /// Heading measured from accelerometer+magnetometer tilt compensation.
    AccelMagFallback,
}

/// What the platform reports as present at startup.
#[derive(Clone, Copy, Debug, Default)]
pub struct SensorAvailability {
    pub has_orientation: bool,
    pub has_accelerometer: bool,
    pub has_magnetometer: bool,
    pub has_gyroscope: bool,
}

#[derive(Debug)]
pub enum EngineError {
    /// Neither a direct orientation sensor nor accelerometer+magnetometer is
    /// present; there is no way to produce a heading.
    NoHeadingSource,
    /// Sensor registration failed even at the conservative fallback rate.
    Registration(String),
    NotStarted,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoHeadingSource => {
                write!(f, "no usable heading source (need orientation sensor or accel+mag)")
            }
            EngineError::Registration(detail) => {
                write!(f, "sensor registration failed: {detail}")
            }
            EngineError::NotStarted => write!(f, "engine has not been started"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Fire-and-forget notifications. Implementations must return quickly; the
/// engine calls these inline on the fusion path.
pub trait OrientationObserver: Send {
    fn on_accuracy_changed(&self, _accuracy: MagAccuracy) {}
    fn on_calibration_prompt(&self, _event: PromptEvent) {}
    fn on_linear_acceleration(&self, _magnitude: f32) {}
}

pub struct NullObserver;

impl OrientationObserver for NullObserver {}

pub struct OrientationEngine {
    config: EngineConfig,
    mode: FusionMode,
    gyro_available: bool,
    running: bool,

    motion: AdaptiveMotionFilter,
    kalman: HeadingFusionFilter,
    interference: InterferenceDetector,
    prompt: CalibrationPromptController,
    declination: DeclinationCache,

    display_rotation: DisplayRotation,
    calibration_offset_degrees: f32,
    accuracy: Option<MagAccuracy>,

    /// Display heading after motion-adaptive smoothing, still magnetic.
    smoothed_heading: Option<f32>,
    tilt_degrees: Option<f32>,
    last_gyro_timestamp_nanos: i64,

    observer: Box<dyn OrientationObserver>,
}

impl OrientationEngine {
    pub fn new(
        config: EngineConfig,
        availability: SensorAvailability,
        observer: Box<dyn OrientationObserver>,
    ) -> Result<Self, EngineError> {
        let mode = if availability.has_orientation {
            FusionMode::DirectOrientation
        } else if availability.has_accelerometer && availability.has_magnetometer {
            FusionMode::AccelMagFallback
        } else {
            return Err(EngineError::NoHeadingSource);
        };

        Ok(Self {
            motion: AdaptiveMotionFilter::new(&config),
            kalman: HeadingFusionFilter::new(&config),
            interference: InterferenceDetector::new(&config),
            prompt: CalibrationPromptController::new(&config),
            declination: DeclinationCache::default(),
            config,
            mode,
            gyro_available: availability.has_gyroscope,
            running: false,
            display_rotation: DisplayRotation::Deg0,
            calibration_offset_degrees: 0.0,
            accuracy: None,
            smoothed_heading: None,
            tilt_degrees: None,
            last_gyro_timestamp_nanos: 0,
            observer,
        })
    }

    /// Reset all filter state and begin accepting samples. Stale estimates
    /// must never survive a restart.
    pub fn start(&mut self) {
        self.motion.reset();
        self.kalman.reset(None);
        self.interference.reset();
        self.prompt.reset();
        self.accuracy = None;
        self.smoothed_heading = None;
        self.tilt_degrees = None;
        self.last_gyro_timestamp_nanos = 0;
        self.running = true;
        info!("orientation engine started in {:?} mode (gyro: {})", self.mode, self.gyro_available);
    }

    /// Stop accepting samples. The published state is frozen at its last
    /// value; restart goes through [`start`](Self::start).
    pub fn stop(&mut self) {
        self.running = false;
        info!("orientation engine stopped");
    }

    pub fn mode(&self) -> FusionMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_display_rotation(&mut self, rotation: DisplayRotation) {
        self.display_rotation = rotation;
    }

    /// Signed degree offset from the external calibration collaborator,
    /// applied on the next fusion cycle.
    pub fn set_calibration_offset(&mut self, offset_degrees: f32) {
        if offset_degrees.is_finite() {
            self.calibration_offset_degrees = offset_degrees;
        }
    }

    /// Force a declination value, bypassing the location-derived cache.
    pub fn set_declination_degrees(&mut self, degrees: f32) {
        self.declination.set_override(degrees);
    }

    pub fn feed_location(&mut self, fix: &LocationFix) {
        self.declination.update_from_fix(fix);
        debug!("declination refreshed: {:.2} deg", self.declination.degrees());
    }

    /// Magnetometer accuracy report from the platform.
    pub fn set_mag_accuracy(&mut self, accuracy: MagAccuracy, now_millis: i64) {
        if self.accuracy != Some(accuracy) {
            self.observer.on_accuracy_changed(accuracy);
            if accuracy < self.config.min_acceptable_accuracy {
                warn!("magnetometer accuracy degraded to {accuracy:?}");
            }
        }
        self.accuracy = Some(accuracy);
        if let Some(event) = self.prompt.on_accuracy_changed(accuracy, now_millis) {
            self.observer.on_calibration_prompt(event);
        }
        self.evaluate_prompt(now_millis);
    }

    pub fn request_manual_calibration(&mut self, now_millis: i64) {
        if let Some(event) = self.prompt.request_manual(now_millis) {
            self.observer.on_calibration_prompt(event);
        }
    }

    pub fn dismiss_calibration(&mut self, now_millis: i64) {
        if let Some(event) = self.prompt.dismiss(now_millis) {
            self.observer.on_calibration_prompt(event);
        }
    }

    pub fn feed_accel(&mut self, sample: &AccelSample) -> Option<OrientationState> {
        if !self.running {
            return None;
        }
        let raw = sample.vector();
        if !raw.x.is_finite() || !raw.y.is_finite() || !raw.z.is_finite() {
            return None;
        }
        let remapped = self.display_rotation.remap(raw);
        let linear_magnitude = self.motion.on_accelerometer_sample(remapped);
        self.observer.on_linear_acceleration(linear_magnitude);

        // Tilt is rotation-invariant in x/y, so raw vs remapped is moot.
        self.tilt_degrees = Some(tilt_from_accel(remapped));
        Some(self.snapshot())
    }

    pub fn feed_gyro(&mut self, sample: &GyroSample) -> Option<OrientationState> {
        if !self.running || !self.gyro_available {
            return None;
        }
        let raw = sample.vector();
        if !raw.x.is_finite() || !raw.y.is_finite() || !raw.z.is_finite() {
            return None;
        }

        let dt = self.gyro_dt_secs(sample.timestamp_nanos);
        let gravity = self.motion.gravity();
        let gravity_norm = gravity.norm();
        if gravity_norm < 1e-3 {
            // No gravity estimate yet, cannot resolve the yaw axis.
            return None;
        }
        let up = gravity / gravity_norm;
        let remapped = self.display_rotation.remap(raw);
        // Positive rotation about the up axis turns the device left, which
        // decreases heading; hence the negation.
        let yaw_rate_deg_per_sec = -remapped.dot(&up).to_degrees();

        self.kalman.predict(yaw_rate_deg_per_sec, dt);
        if let Some(smoothed) = self.smoothed_heading {
            // Predict-driven updates are trusted between corrections and are
            // exempt from accuracy gating.
            self.smoothed_heading =
                Some(angle::normalize_degrees(smoothed + yaw_rate_deg_per_sec * dt));
        }
        Some(self.snapshot())
    }

    pub fn feed_mag(&mut self, sample: &MagSample) -> Option<OrientationState> {
        if !self.running {
            return None;
        }
        let raw = sample.vector();
        if !raw.x.is_finite() || !raw.y.is_finite() || !raw.z.is_finite() {
            return None;
        }

        let now_millis = sample.timestamp_nanos / 1_000_000;
        let was_active = self.interference.is_active();
        let active = self.interference.on_magnetometer_sample(raw);
        if active != was_active {
            info!("magnetic interference {}", if active { "detected" } else { "cleared" });
            self.prompt.set_interference(active, now_millis);
        }
        self.evaluate_prompt(now_millis);

        if self.mode == FusionMode::AccelMagFallback {
            let remapped = self.display_rotation.remap(raw);
            if let Some(raw_heading) =
                tilt_compensated_heading(self.motion.gravity(), remapped)
            {
                self.apply_measurement(raw_heading, sample.timestamp_nanos);
            }
        }
        Some(self.snapshot())
    }

    /// Direct orientation-sensor reading; the measurement source in
    /// [`FusionMode::DirectOrientation`].
    pub fn feed_heading(&mut self, sample: &HeadingSample) -> Option<OrientationState> {
        if !self.running || self.mode != FusionMode::DirectOrientation {
            return None;
        }
        if !sample.magnetic_heading_degrees.is_finite() {
            return None;
        }
        self.apply_measurement(sample.magnetic_heading_degrees, sample.timestamp_nanos);
        Some(self.snapshot())
    }

    pub fn state(&self) -> OrientationState {
        self.snapshot()
    }

    fn gyro_dt_secs(&mut self, timestamp_nanos: i64) -> f32 {
        let dt = if self.last_gyro_timestamp_nanos == 0 {
            self.config.default_dt_secs
        } else {
            let raw = (timestamp_nanos - self.last_gyro_timestamp_nanos) as f32 * 1e-9;
            raw.clamp(self.config.min_dt_secs, self.config.max_dt_secs)
        };
        self.last_gyro_timestamp_nanos = timestamp_nanos;
        dt
    }

    /// Fold a magnetic heading measurement into the filter and the smoothed
    /// display heading. Low accuracy freezes the heading, except for the very
    /// first estimate so the output cannot stay stuck in `Initializing`.
    fn apply_measurement(&mut self, raw_heading_degrees: f32, timestamp_nanos: i64) {
        let accuracy_ok = match self.accuracy {
            Some(accuracy) => accuracy >= self.config.min_acceptable_accuracy,
            None => true,
        };
        if !accuracy_ok && self.kalman.heading().is_some() {
            return;
        }

        self.kalman.correct(raw_heading_degrees);
        let fused = match self.kalman.heading() {
            Some(h) => h,
            None => return,
        };

        let alpha = self.motion.compute_alpha(timestamp_nanos, raw_heading_degrees);
        self.smoothed_heading = Some(match self.smoothed_heading {
            Some(previous) => angle::smooth(previous, fused, alpha),
            None => fused,
        });
    }

    fn evaluate_prompt(&mut self, now_millis: i64) {
        if let Some(event) = self.prompt.evaluate(now_millis) {
            self.observer.on_calibration_prompt(event);
        }
    }

    fn compass_status(&self) -> CompassStatus {
        // Accuracy-driven status outranks the magnitude heuristic.
        if let Some(accuracy) = self.accuracy {
            if accuracy < self.config.min_acceptable_accuracy {
                return CompassStatus::NeedsCalibration;
            }
        }
        if self.interference.is_active() {
            return CompassStatus::Interference;
        }
        CompassStatus::Ok
    }

    fn snapshot(&self) -> OrientationState {
        let magnetic = match self.smoothed_heading {
            Some(h) => h,
            None => return OrientationState::Initializing,
        };
        let true_heading = angle::normalize_degrees(
            magnetic + self.declination.degrees() + self.calibration_offset_degrees,
        );
        let tilt = self.tilt_degrees.unwrap_or(0.0);
        let (is_flat, is_vertical) = match self.tilt_degrees {
            Some(t) => self.classify_tilt(t),
            None => (false, false),
        };
        OrientationState::Available {
            true_heading_degrees: true_heading,
            compass_status: self.compass_status(),
            is_phone_flat: is_flat,
            is_phone_vertical: is_vertical,
            phone_tilt_degrees: tilt,
            should_show_calibration: self.prompt.is_visible(),
        }
    }

    fn classify_tilt(&self, tilt_degrees: f32) -> (bool, bool) {
        let flat = tilt_degrees >= self.config.flat_band_min_degrees
            && tilt_degrees <= self.config.flat_band_max_degrees;
        let vertical = tilt_degrees <= self.config.vertical_low_degrees
            || tilt_degrees >= self.config.vertical_high_degrees;
        (flat, vertical)
    }
}

/// Tilt angle from an accelerometer reading, degrees.
fn tilt_from_accel(accel: Vector3<f32>) -> f32 {
    (accel.x * accel.x + accel.y * accel.y).sqrt().atan2(accel.z).to_degrees()
}

/// Magnetic heading from gravity and magnetic field in the device frame.
///
/// Both vectors are projected onto the horizontal plane (perpendicular to
/// gravity); the heading is the signed angle from the projected screen-top
/// axis to the projected field, measured clockwise when viewed from above.
/// Returns `None` when either projection degenerates (device pointing
/// straight along gravity, or no gravity estimate yet).
pub fn tilt_compensated_heading(
    gravity: Vector3<f32>,
    mag_micro_tesla: Vector3<f32>,
) -> Option<f32> {
    let gravity_norm = gravity.norm();
    if gravity_norm < 1e-3 {
        return None;
    }
    let up = gravity / gravity_norm;

    let top = Vector3::new(0.0, 1.0, 0.0);
    let top_h = top - up * top.dot(&up);
    let mag_h = mag_micro_tesla - up * mag_micro_tesla.dot(&up);
    if top_h.norm() < 1e-4 || mag_h.norm() < 1e-4 {
        return None;
    }

    let heading_rad = top_h.cross(&mag_h).dot(&up).atan2(top_h.dot(&mag_h));
    Some(angle::normalize_degrees(heading_rad.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn availability_direct() -> SensorAvailability {
        SensorAvailability {
            has_orientation: true,
            has_accelerometer: true,
            has_magnetometer: true,
            has_gyroscope: true,
        }
    }

    fn availability_fallback() -> SensorAvailability {
        SensorAvailability {
            has_orientation: false,
            has_accelerometer: true,
            has_magnetometer: true,
            has_gyroscope: false,
        }
    }

    fn started(availability: SensorAvailability) -> OrientationEngine {
        let mut engine =
            OrientationEngine::new(EngineConfig::default(), availability, Box::new(NullObserver))
                .unwrap();
        engine.start();
        engine
    }

    fn heading_of(state: OrientationState) -> f32 {
        match state {
            OrientationState::Available { true_heading_degrees, .. } => true_heading_degrees,
            OrientationState::Initializing => panic!("expected Available state"),
        }
    }

    #[test]
    fn test_no_heading_source_is_fatal() {
        let availability = SensorAvailability {
            has_orientation: false,
            has_accelerometer: true,
            has_magnetometer: false,
            has_gyroscope: true,
        };
        let result =
            OrientationEngine::new(EngineConfig::default(), availability, Box::new(NullObserver));
        assert!(matches!(result, Err(EngineError::NoHeadingSource)));
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(started(availability_direct()).mode(), FusionMode::DirectOrientation);
        assert_eq!(started(availability_fallback()).mode(), FusionMode::AccelMagFallback);
    }

    #[test]
    fn test_initializing_until_first_measurement() {
        let mut engine = started(availability_direct());
        assert_eq!(engine.state(), OrientationState::Initializing);

        let state = engine
            .feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 45.0 })
            .unwrap();
        assert!(matches!(state, OrientationState::Available { .. }));
    }

    #[test]
    fn test_declination_and_offset_applied() {
        let mut engine = started(availability_direct());
        engine.set_declination_degrees(2.0);
        engine.set_calibration_offset(1.5);

        let state = engine
            .feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 45.0 })
            .unwrap();
        // Bootstrap adopts 45 exactly; published heading adds 2 + 1.5
        assert_relative_eq!(heading_of(state), 48.5, epsilon = 1e-3);
    }

    #[test]
    fn test_low_accuracy_freezes_heading_after_first_estimate() {
        let mut engine = started(availability_direct());
        engine.set_mag_accuracy(MagAccuracy::High, 0);
        engine.feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 100.0 });

        engine.set_mag_accuracy(MagAccuracy::Unreliable, 100);
        let state = engine
            .feed_heading(&HeadingSample { timestamp_nanos: 21_000_000, magnetic_heading_degrees: 200.0 })
            .unwrap();
        assert_relative_eq!(heading_of(state), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_first_estimate_accepted_even_at_low_accuracy() {
        let mut engine = started(availability_direct());
        engine.set_mag_accuracy(MagAccuracy::Unreliable, 0);
        let state = engine
            .feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 77.0 })
            .unwrap();
        assert_relative_eq!(heading_of(state), 77.0, epsilon = 1e-3);
    }

    #[test]
    fn test_status_priority_needs_calibration_over_interference() {
        let mut engine = started(availability_direct());
        engine.feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 10.0 });
        engine.set_mag_accuracy(MagAccuracy::Unreliable, 0);

        // Sustained out-of-band field raises interference internally
        for i in 0..15 {
            engine.feed_mag(&MagSample {
                timestamp_nanos: 2_000_000 + i * 20_000_000,
                x: 150.0,
                y: 0.0,
                z: 0.0,
            });
        }

        match engine.state() {
            OrientationState::Available { compass_status, .. } => {
                assert_eq!(compass_status, CompassStatus::NeedsCalibration);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }
    }

    #[test]
    fn test_interference_status_with_good_accuracy() {
        let mut engine = started(availability_direct());
        engine.set_mag_accuracy(MagAccuracy::High, 0);
        engine.feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 10.0 });
        for i in 0..10 {
            engine.feed_mag(&MagSample {
                timestamp_nanos: 2_000_000 + i * 20_000_000,
                x: 150.0,
                y: 0.0,
                z: 0.0,
            });
        }
        match engine.state() {
            OrientationState::Available { compass_status, .. } => {
                assert_eq!(compass_status, CompassStatus::Interference);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }
    }

    #[test]
    fn test_tilt_classification_boundaries() {
        let mut engine = started(availability_direct());
        engine.feed_heading(&HeadingSample { timestamp_nanos: 500_000, magnetic_heading_degrees: 0.0 });

        // Tilt 90: screen edge-on to gravity
        let state = engine
            .feed_accel(&AccelSample { timestamp_nanos: 1_000_000, x: 0.0, y: 9.81, z: 0.0 })
            .unwrap();
        match state {
            OrientationState::Available { is_phone_flat, is_phone_vertical, phone_tilt_degrees, .. } => {
                assert!(is_phone_flat);
                assert!(!is_phone_vertical);
                assert_relative_eq!(phone_tilt_degrees, 90.0, epsilon = 1e-3);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }

        // Tilt 0
        let state = engine
            .feed_accel(&AccelSample { timestamp_nanos: 21_000_000, x: 0.0, y: 0.0, z: 9.81 })
            .unwrap();
        match state {
            OrientationState::Available { is_phone_flat, is_phone_vertical, .. } => {
                assert!(!is_phone_flat);
                assert!(is_phone_vertical);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }

        // Tilt 45: neither
        let state = engine
            .feed_accel(&AccelSample { timestamp_nanos: 41_000_000, x: 0.0, y: 6.94, z: 6.94 })
            .unwrap();
        match state {
            OrientationState::Available { is_phone_flat, is_phone_vertical, .. } => {
                assert!(!is_phone_flat);
                assert!(!is_phone_vertical);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }
    }

    #[test]
    fn test_tilt_compensated_heading_cardinal_directions() {
        // Device flat on a table: gravity along +z in the device frame.
        let gravity = Vector3::new(0.0, 0.0, 9.81);

        // Facing north: horizontal field along the screen-top axis
        let north = tilt_compensated_heading(gravity, Vector3::new(0.0, 40.0, -30.0)).unwrap();
        assert_relative_eq!(north, 0.0, epsilon = 0.01);

        // Facing east: field appears along -x in the device frame
        let east = tilt_compensated_heading(gravity, Vector3::new(-40.0, 0.0, -30.0)).unwrap();
        assert_relative_eq!(east, 90.0, epsilon = 0.01);

        // Facing west
        let west = tilt_compensated_heading(gravity, Vector3::new(40.0, 0.0, -30.0)).unwrap();
        assert_relative_eq!(west, 270.0, epsilon = 0.01);
    }

    #[test]
    fn test_tilt_compensated_heading_degenerate_cases() {
        assert_eq!(
            tilt_compensated_heading(Vector3::zeros(), Vector3::new(0.0, 40.0, 0.0)),
            None
        );
        // Gravity along the screen-top axis: the top projection vanishes
        assert_eq!(
            tilt_compensated_heading(Vector3::new(0.0, 9.81, 0.0), Vector3::new(0.0, 40.0, 0.0)),
            None
        );
    }

    #[test]
    fn test_fallback_mode_measures_from_accel_and_mag() {
        let mut engine = started(availability_fallback());
        // Settle the gravity estimate while flat on a table
        for i in 0..30 {
            engine.feed_accel(&AccelSample {
                timestamp_nanos: i * 20_000_000,
                x: 0.0,
                y: 0.0,
                z: 9.81,
            });
        }
        let state = engine
            .feed_mag(&MagSample { timestamp_nanos: 700_000_000, x: -40.0, y: 0.0, z: -30.0 })
            .unwrap();
        assert_relative_eq!(heading_of(state), 90.0, epsilon = 0.5);
    }

    #[test]
    fn test_restart_clears_estimate() {
        let mut engine = started(availability_direct());
        engine.feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 45.0 });
        assert!(matches!(engine.state(), OrientationState::Available { .. }));

        engine.stop();
        assert_eq!(
            engine.feed_heading(&HeadingSample { timestamp_nanos: 2_000_000, magnetic_heading_degrees: 45.0 }),
            None
        );

        engine.start();
        assert_eq!(engine.state(), OrientationState::Initializing);
    }

    #[test]
    fn test_nan_samples_never_reach_published_state() {
        let mut engine = started(availability_direct());
        engine.feed_heading(&HeadingSample { timestamp_nanos: 1_000_000, magnetic_heading_degrees: 45.0 });
        engine.feed_heading(&HeadingSample { timestamp_nanos: 2_000_000, magnetic_heading_degrees: f32::NAN });
        engine.feed_accel(&AccelSample { timestamp_nanos: 3_000_000, x: f32::NAN, y: 0.0, z: 9.81 });
        engine.feed_mag(&MagSample { timestamp_nanos: 4_000_000, x: f32::INFINITY, y: 0.0, z: 0.0 });

        match engine.state() {
            OrientationState::Available { true_heading_degrees, phone_tilt_degrees, .. } => {
                assert!(true_heading_degrees.is_finite());
                assert!(phone_tilt_degrees.is_finite());
                assert_relative_eq!(true_heading_degrees, 45.0, epsilon = 1e-3);
            }
            OrientationState::Initializing => panic!("expected Available state"),
        }
    }
}
