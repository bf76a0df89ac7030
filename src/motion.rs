//! Adaptive motion filter: separates gravity from linear acceleration and
//! derives a time-constant for heading smoothing from how much the device is
//! actually moving. Fast response while the user turns, heavy damping at rest.

use nalgebra::Vector3;

use crate::angle;
use crate::config::EngineConfig;

pub struct AdaptiveMotionFilter {
    gravity: Vector3<f32>,
    gravity_initialized: bool,
    motion_estimate: f32,
    last_heading_sample: Option<f32>,
    last_event_timestamp_nanos: i64,

    gravity_alpha: f32,
    decay: f32,
    recent_weight: f32,
    noise_floor: f32,
    max_contribution: f32,
    motion_weight: f32,
    rate_weight: f32,
    activity_high: f32,
    activity_medium: f32,
    tau_fast: f32,
    tau_medium: f32,
    tau_slow: f32,
    alpha_min: f32,
    alpha_max: f32,
    default_dt: f32,
    min_dt: f32,
    max_dt: f32,
}

impl AdaptiveMotionFilter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            gravity: Vector3::zeros(),
            gravity_initialized: false,
            motion_estimate: 0.0,
            last_heading_sample: None,
            last_event_timestamp_nanos: 0,
            gravity_alpha: config.gravity_alpha,
            decay: config.motion_decay,
            recent_weight: config.motion_recent_weight,
            noise_floor: config.motion_noise_floor,
            max_contribution: config.motion_max_contribution,
            motion_weight: config.activity_motion_weight,
            rate_weight: config.activity_rate_weight,
            activity_high: config.activity_high_threshold,
            activity_medium: config.activity_medium_threshold,
            tau_fast: config.tau_fast_secs,
            tau_medium: config.tau_medium_secs,
            tau_slow: config.tau_slow_secs,
            alpha_min: config.alpha_min,
            alpha_max: config.alpha_max,
            default_dt: config.default_dt_secs,
            min_dt: config.min_dt_secs,
            max_dt: config.max_dt_secs,
        }
    }

    /// Update the gravity estimate and motion scalar from one accelerometer
    /// sample. Returns the linear-acceleration magnitude for observers.
    pub fn on_accelerometer_sample(&mut self, raw: Vector3<f32>) -> f32 {
        if !self.gravity_initialized {
            self.gravity = raw;
            self.gravity_initialized = true;
            return 0.0;
        }

        self.gravity = self.gravity * self.gravity_alpha + raw * (1.0 - self.gravity_alpha);
        let linear = raw - self.gravity;
        let magnitude = linear.norm();

        let contribution = (magnitude - self.noise_floor).clamp(0.0, self.max_contribution);
        self.motion_estimate = self.motion_estimate * self.decay + contribution * self.recent_weight;

        magnitude
    }

    /// Current per-axis gravity estimate.
    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    pub fn motion_estimate(&self) -> f32 {
        self.motion_estimate
    }

    /// Compute the smoothing coefficient for a new raw heading measurement.
    ///
    /// Combines the heading rate-of-change with the decayed motion estimate
    /// into a single activity scalar, picks one of three time constants from
    /// it, and converts that to `dt / (tau + dt)` clamped to the configured
    /// range. The first call after a reset has no previous heading, so the
    /// rate term is zero rather than an error.
    pub fn compute_alpha(&mut self, timestamp_nanos: i64, raw_heading_degrees: f32) -> f32 {
        let dt = if self.last_event_timestamp_nanos == 0 {
            self.default_dt
        } else {
            let raw_dt = (timestamp_nanos - self.last_event_timestamp_nanos) as f32 * 1e-9;
            raw_dt.clamp(self.min_dt, self.max_dt)
        };
        self.last_event_timestamp_nanos = timestamp_nanos;

        let rate = match self.last_heading_sample {
            Some(prev) => angle::shortest_difference(prev, raw_heading_degrees).abs() / dt,
            None => 0.0,
        };
        self.last_heading_sample = Some(raw_heading_degrees);

        let activity = self.motion_estimate * self.motion_weight + rate * self.rate_weight;
        let tau = if activity > self.activity_high {
            self.tau_fast
        } else if activity > self.activity_medium {
            self.tau_medium
        } else {
            self.tau_slow
        };

        (dt / (tau + dt)).clamp(self.alpha_min, self.alpha_max)
    }

    pub fn reset(&mut self) {
        self.gravity = Vector3::zeros();
        self.gravity_initialized = false;
        self.motion_estimate = 0.0;
        self.last_heading_sample = None;
        self.last_event_timestamp_nanos = 0;
    }
}
