//! Calibration-prompt state machine.
//!
//! Decides when the "wave your phone in a figure eight" prompt is worth
//! showing. Automatic triggers (sustained low accuracy, sustained magnetic
//! interference) are debounced and rate-limited by a post-dismissal cooldown;
//! an explicit user request bypasses both.

use serde::Serialize;

use crate::config::EngineConfig;
use crate::types::MagAccuracy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PromptCause {
    LowAccuracy,
    Interference,
    ManualRequest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptEvent {
    Shown(PromptCause),
    Dismissed,
}

/// Monotonic-clock timestamps in milliseconds; zero means "not currently
/// tracking this condition".
#[derive(Clone, Copy, Debug, Default)]
pub struct CalibrationPromptTimers {
    pub low_accuracy_start_millis: i64,
    pub interference_start_millis: i64,
    pub last_accuracy_change_millis: i64,
    pub cooldown_until_millis: i64,
}

pub struct CalibrationPromptController {
    timers: CalibrationPromptTimers,
    visible: bool,
    accuracy_low: bool,
    interference_active: bool,
    trigger_millis: i64,
    cooldown_millis: i64,
}

/// Clock anomalies (timestamps going backwards) read as zero elapsed time.
fn elapsed(now_millis: i64, since_millis: i64) -> i64 {
    (now_millis - since_millis).max(0)
}

impl CalibrationPromptController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timers: CalibrationPromptTimers::default(),
            visible: false,
            accuracy_low: false,
            interference_active: false,
            trigger_millis: config.calibration_trigger_millis,
            cooldown_millis: config.calibration_cooldown_millis,
        }
    }

    /// Record a magnetometer accuracy report. Recovery to an acceptable
    /// accuracy hides a visible prompt automatically, but only while no
    /// interference condition is active.
    pub fn on_accuracy_changed(
        &mut self,
        accuracy: MagAccuracy,
        now_millis: i64,
    ) -> Option<PromptEvent> {
        self.timers.last_accuracy_change_millis = now_millis;
        let low = accuracy <= MagAccuracy::Low;

        if low {
            if !self.accuracy_low {
                self.timers.low_accuracy_start_millis = now_millis;
            }
            self.accuracy_low = true;
            None
        } else {
            self.accuracy_low = false;
            self.timers.low_accuracy_start_millis = 0;
            if self.visible && !self.interference_active {
                self.visible = false;
                Some(PromptEvent::Dismissed)
            } else {
                None
            }
        }
    }

    /// Track transitions of the interference condition from the detector.
    pub fn set_interference(&mut self, active: bool, now_millis: i64) {
        if active && !self.interference_active {
            self.timers.interference_start_millis = now_millis;
        }
        if !active {
            self.timers.interference_start_millis = 0;
        }
        self.interference_active = active;
    }

    /// Run the debounce logic. Returns a show event at most once per
    /// visibility episode; automatic triggers are suppressed during cooldown.
    pub fn evaluate(&mut self, now_millis: i64) -> Option<PromptEvent> {
        if self.visible || now_millis < self.timers.cooldown_until_millis {
            return None;
        }

        if self.accuracy_low
            && elapsed(now_millis, self.timers.last_accuracy_change_millis) >= self.trigger_millis
        {
            self.visible = true;
            return Some(PromptEvent::Shown(PromptCause::LowAccuracy));
        }

        if self.interference_active
            && elapsed(now_millis, self.timers.interference_start_millis) >= self.trigger_millis
        {
            self.visible = true;
            return Some(PromptEvent::Shown(PromptCause::Interference));
        }

        None
    }

    /// User asked for calibration explicitly; never debounced, never
    /// suppressed by cooldown.
    pub fn request_manual(&mut self, _now_millis: i64) -> Option<PromptEvent> {
        if self.visible {
            None
        } else {
            self.visible = true;
            Some(PromptEvent::Shown(PromptCause::ManualRequest))
        }
    }

    /// User dismissal is always honored and starts the cooldown window.
    pub fn dismiss(&mut self, now_millis: i64) -> Option<PromptEvent> {
        if self.visible {
            self.visible = false;
            self.timers.cooldown_until_millis = now_millis + self.cooldown_millis;
            Some(PromptEvent::Dismissed)
        } else {
            None
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn timers(&self) -> CalibrationPromptTimers {
        self.timers
    }

    pub fn reset(&mut self) {
        self.timers = CalibrationPromptTimers::default();
        self.visible = false;
        self.accuracy_low = false;
        self.interference_active = false;
    }
}
