//! Magnetic interference detection from field magnitude.
//!
//! Earth's field is roughly 25-65 µT; readings far outside that band mean a
//! magnet, a car body, or a desk full of electronics. Entry and exit use
//! different streak lengths so the status does not flicker when the
//! magnitude hovers at a band edge.

use nalgebra::Vector3;

use crate::config::EngineConfig;

/// Consecutive-sample streaks. Exactly one of the two is non-zero at any
/// time; both are clamped so they can never grow without bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterferenceCounters {
    pub in_band: u32,
    pub out_of_band: u32,
}

pub struct InterferenceDetector {
    counters: InterferenceCounters,
    active: bool,
    band_min: f32,
    band_max: f32,
    trigger_count: u32,
    clear_count: u32,
    count_ceiling: u32,
}

impl InterferenceDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            counters: InterferenceCounters::default(),
            active: false,
            band_min: config.field_min_micro_tesla,
            band_max: config.field_max_micro_tesla,
            trigger_count: config.interference_trigger_count,
            clear_count: config.interference_clear_count,
            count_ceiling: config.interference_count_ceiling,
        }
    }

    /// Classify one magnetometer sample and return whether interference is
    /// currently active. Malformed samples leave the state untouched.
    pub fn on_magnetometer_sample(&mut self, field_micro_tesla: Vector3<f32>) -> bool {
        let magnitude = field_micro_tesla.norm();
        if !magnitude.is_finite() {
            return self.active;
        }

        if magnitude >= self.band_min && magnitude <= self.band_max {
            self.counters.in_band = (self.counters.in_band + 1).min(self.count_ceiling);
            self.counters.out_of_band = 0;
            if self.active && self.counters.in_band >= self.clear_count {
                self.active = false;
            }
        } else {
            self.counters.out_of_band = (self.counters.out_of_band + 1).min(self.count_ceiling);
            self.counters.in_band = 0;
            if !self.active && self.counters.out_of_band >= self.trigger_count {
                self.active = true;
            }
        }

        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn counters(&self) -> InterferenceCounters {
        self.counters
    }

    pub fn reset(&mut self) {
        self.counters = InterferenceCounters::default();
        self.active = false;
    }
}
