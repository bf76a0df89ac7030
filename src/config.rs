use crate::types::MagAccuracy;

/// All engine tunables in one place, immutable for the engine's lifetime.
///
/// Defaults are tuned for a handheld phone compass: responsive while the
/// device is turning, heavily damped at rest.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    // ── Sampling ──
    /// Requested sensor sampling period (20_000 µs = 50 Hz).
    pub sensor_period_micros: u32,
    /// Conservative retry period when registration at the requested rate fails.
    pub fallback_period_micros: u32,
    /// dt assumed for the first sample after a reset.
    pub default_dt_secs: f32,
    /// Floor for timestamp deltas; protects against zero or negative dt.
    pub min_dt_secs: f32,
    /// Ceiling for timestamp deltas; a longer gap is treated as this.
    pub max_dt_secs: f32,

    // ── Gravity separation / motion estimate ──
    /// One-pole low-pass coefficient for the per-axis gravity estimate.
    pub gravity_alpha: f32,
    /// Geometric decay applied to the motion estimate each accel sample.
    pub motion_decay: f32,
    /// Weight of the newest clamped linear-acceleration magnitude.
    pub motion_recent_weight: f32,
    /// Linear-acceleration magnitude below this is treated as sensor noise (m/s²).
    pub motion_noise_floor: f32,
    /// Per-sample contribution cap so a single spike cannot dominate (m/s²).
    pub motion_max_contribution: f32,

    // ── Adaptive heading smoothing ──
    /// Weight of the motion estimate in the combined activity scalar.
    pub activity_motion_weight: f32,
    /// Weight of the heading rate-of-change (deg/s) in the activity scalar.
    pub activity_rate_weight: f32,
    /// Activity above this selects the fast time constant.
    pub activity_high_threshold: f32,
    /// Activity above this (but below high) selects the medium time constant.
    pub activity_medium_threshold: f32,
    pub tau_fast_secs: f32,
    pub tau_medium_secs: f32,
    pub tau_slow_secs: f32,
    pub alpha_min: f32,
    pub alpha_max: f32,

    // ── Heading Kalman filter ──
    /// Error variance assigned when the first measurement bootstraps the filter (deg²).
    pub kalman_initial_error: f32,
    /// Variance growth per predict step (deg²).
    pub kalman_process_noise: f32,
    /// Extra variance growth proportional to |gyro rate|·dt.
    pub kalman_gyro_noise_coeff: f32,
    /// Measurement noise of the tilt-compensated magnetic heading (deg²).
    pub kalman_measurement_noise: f32,
    /// Variance never decays below this (deg²).
    pub kalman_process_noise_floor: f32,

    // ── Interference detection ──
    /// Lower edge of the accepted ambient field band (µT). Wider than the
    /// physical 25-65 µT range to avoid false positives at band edges.
    pub field_min_micro_tesla: f32,
    /// Upper edge of the accepted ambient field band (µT).
    pub field_max_micro_tesla: f32,
    /// Consecutive out-of-band samples required to raise interference.
    pub interference_trigger_count: u32,
    /// Consecutive in-band samples required to clear it (asymmetric hysteresis).
    pub interference_clear_count: u32,
    /// Ceiling for both streak counters.
    pub interference_count_ceiling: u32,

    // ── Calibration prompt ──
    /// How long a low-accuracy or interference condition must persist
    /// before the prompt is shown automatically.
    pub calibration_trigger_millis: i64,
    /// Automatic triggers are suppressed this long after a dismissal.
    pub calibration_cooldown_millis: i64,

    // ── Accuracy gating ──
    /// Magnetometer corrections below this accuracy freeze the heading.
    pub min_acceptable_accuracy: MagAccuracy,

    // ── Tilt classification ──
    /// Flat band is forgiving because flat-detection gates a correctness warning.
    pub flat_band_min_degrees: f32,
    pub flat_band_max_degrees: f32,
    /// Vertical bands are strict; vertical-detection is advisory only.
    pub vertical_low_degrees: f32,
    pub vertical_high_degrees: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensor_period_micros: 20_000,
            fallback_period_micros: 66_667,
            default_dt_secs: 0.02,
            min_dt_secs: 0.001,
            max_dt_secs: 0.5,
            gravity_alpha: 0.85,
            motion_decay: 0.90,
            motion_recent_weight: 0.40,
            motion_noise_floor: 0.15,
            motion_max_contribution: 3.0,
            activity_motion_weight: 1.0,
            activity_rate_weight: 0.05,
            activity_high_threshold: 1.5,
            activity_medium_threshold: 0.4,
            tau_fast_secs: 0.08,
            tau_medium_secs: 0.30,
            tau_slow_secs: 0.80,
            alpha_min: 0.02,
            alpha_max: 0.90,
            kalman_initial_error: 10.0,
            kalman_process_noise: 0.02,
            kalman_gyro_noise_coeff: 0.05,
            kalman_measurement_noise: 4.0,
            kalman_process_noise_floor: 0.01,
            field_min_micro_tesla: 20.0,
            field_max_micro_tesla: 80.0,
            interference_trigger_count: 10,
            interference_clear_count: 20,
            interference_count_ceiling: 1000,
            calibration_trigger_millis: 3_000,
            calibration_cooldown_millis: 30_000,
            min_acceptable_accuracy: MagAccuracy::Medium,
            flat_band_min_degrees: 65.0,
            flat_band_max_degrees: 115.0,
            vertical_low_degrees: 10.0,
            vertical_high_degrees: 170.0,
        }
    }
}
