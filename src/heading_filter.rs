//! Scalar Kalman filter over the compass heading.
//!
//! A full 2-D/3-D attitude filter is unnecessary here: only heading drives
//! the output, and a single state variable with an error variance captures
//! the accuracy/responsiveness tradeoff. Predict integrates the gyro rate
//! and grows uncertainty; correct folds in a tilt-compensated magnetic
//! heading measurement and shrinks it.

use crate::angle;
use crate::config::EngineConfig;

/// Filter state. Owned exclusively by [`HeadingFusionFilter`]; reset on
/// every engine (re)start so no stale estimate survives a restart.
#[derive(Clone, Copy, Debug)]
pub struct HeadingEstimate {
    pub heading_degrees: Option<f32>,
    pub error_variance: f32,
}

pub struct HeadingFusionFilter {
    estimate: HeadingEstimate,
    initial_error: f32,
    process_noise: f32,
    gyro_noise_coeff: f32,
    measurement_noise: f32,
    process_noise_floor: f32,
}

impl HeadingFusionFilter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            estimate: HeadingEstimate {
                heading_degrees: None,
                error_variance: config.kalman_initial_error,
            },
            initial_error: config.kalman_initial_error,
            process_noise: config.kalman_process_noise,
            gyro_noise_coeff: config.kalman_gyro_noise_coeff,
            measurement_noise: config.kalman_measurement_noise,
            process_noise_floor: config.kalman_process_noise_floor,
        }
    }

    /// Gyro-driven predict step. A gyro alone cannot bootstrap an absolute
    /// heading, so this is a no-op until the first correction.
    pub fn predict(&mut self, rate_deg_per_sec: f32, dt_secs: f32) {
        if !rate_deg_per_sec.is_finite() || !dt_secs.is_finite() || dt_secs <= 0.0 {
            return;
        }
        if let Some(heading) = self.estimate.heading_degrees {
            self.estimate.heading_degrees =
                Some(angle::normalize_degrees(heading + rate_deg_per_sec * dt_secs));
            self.estimate.error_variance +=
                self.process_noise + self.gyro_noise_coeff * rate_deg_per_sec.abs() * dt_secs;
        }
    }

    /// Measurement update. The first measurement is adopted directly with the
    /// configured initial variance; afterwards the innovation is the shortest
    /// angular difference so corrections never take the long way around.
    pub fn correct(&mut self, measured_heading_degrees: f32) {
        if !measured_heading_degrees.is_finite() {
            return;
        }
        match self.estimate.heading_degrees {
            None => {
                self.estimate.heading_degrees =
                    Some(angle::normalize_degrees(measured_heading_degrees));
                self.estimate.error_variance = self.initial_error;
            }
            Some(heading) => {
                let denominator = self.estimate.error_variance + self.measurement_noise;
                if denominator <= 0.0 || !denominator.is_finite() {
                    return;
                }
                let gain = self.estimate.error_variance / denominator;
                self.estimate.heading_degrees =
                    Some(angle::smooth(heading, measured_heading_degrees, gain));
                self.estimate.error_variance =
                    (1.0 - gain) * self.estimate.error_variance + self.process_noise_floor;
            }
        }
    }

    pub fn reset(&mut self, initial_heading_degrees: Option<f32>) {
        self.estimate.heading_degrees = initial_heading_degrees.map(angle::normalize_degrees);
        self.estimate.error_variance = self.initial_error;
    }

    pub fn heading(&self) -> Option<f32> {
        self.estimate.heading_degrees
    }

    pub fn error_variance(&self) -> f32 {
        self.estimate.error_variance
    }

    pub fn estimate(&self) -> HeadingEstimate {
        self.estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fresh() -> HeadingFusionFilter {
        HeadingFusionFilter::new(&EngineConfig::default())
    }

    #[test]
    fn test_bootstrap_adopts_measurement_exactly() {
        let mut kf = fresh();
        kf.correct(90.0);
        assert_eq!(kf.heading(), Some(90.0));
        assert_eq!(kf.error_variance(), EngineConfig::default().kalman_initial_error);
    }

    #[test]
    fn test_predict_is_noop_without_estimate() {
        let mut kf = fresh();
        kf.predict(30.0, 0.02);
        assert_eq!(kf.heading(), None);
    }

    #[test]
    fn test_predict_integrates_rate_and_grows_variance() {
        let mut kf = fresh();
        kf.correct(10.0);
        let v0 = kf.error_variance();
        kf.predict(45.0, 0.1);
        assert_relative_eq!(kf.heading().unwrap(), 14.5, epsilon = 1e-3);
        assert!(kf.error_variance() > v0);
    }

    #[test]
    fn test_convergence_to_constant_measurement() {
        let cfg = EngineConfig::default();
        let mut kf = fresh();
        kf.correct(30.0);
        // Knock the estimate off with a predict, then hold the measurement
        kf.predict(100.0, 0.5);
        let mut last_variance = kf.error_variance();
        for _ in 0..20 {
            kf.correct(30.0);
            assert!(kf.error_variance() <= last_variance + 1e-6);
            last_variance = kf.error_variance();
        }
        assert!((kf.heading().unwrap() - 30.0).abs() < 1.0);
        // Variance settles close to the process noise floor
        assert!(last_variance < cfg.kalman_initial_error / 10.0);
    }

    #[test]
    fn test_correction_crosses_wraparound() {
        let mut kf = fresh();
        kf.correct(359.0);
        for _ in 0..20 {
            kf.correct(3.0);
        }
        let h = kf.heading().unwrap();
        assert!(
            h < 4.0 || h > 358.0,
            "heading should converge through the 0/360 seam, got {h}"
        );
    }

    #[test]
    fn test_nan_measurement_dropped() {
        let mut kf = fresh();
        kf.correct(45.0);
        kf.correct(f32::NAN);
        assert_eq!(kf.heading(), Some(45.0));
        assert!(kf.error_variance().is_finite());
    }

    #[test]
    fn test_reset_clears_or_seeds() {
        let mut kf = fresh();
        kf.correct(123.0);
        kf.reset(None);
        assert_eq!(kf.heading(), None);

        kf.reset(Some(-90.0));
        assert_eq!(kf.heading(), Some(270.0));
        assert_eq!(kf.error_variance(), EngineConfig::default().kalman_initial_error);
    }
}
