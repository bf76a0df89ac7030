//! Orientation fusion engine for a phone compass.
//!
//! Converts raw magnetometer, accelerometer, and gyroscope streams into a
//! single stable true-north heading, tracks sensor trust, and drives a
//! calibration-prompt state machine. The computation core ([`engine`]) is
//! synchronous and allocation-light; [`service`] wraps it in a tokio worker
//! with channel-based sensor delivery and `watch`-based publication.

pub mod angle;
pub mod calibration_prompt;
pub mod config;
pub mod declination;
pub mod engine;
pub mod heading_filter;
pub mod interference;
pub mod motion;
pub mod service;
pub mod types;

pub use calibration_prompt::{PromptCause, PromptEvent};
pub use config::EngineConfig;
pub use engine::{
    EngineError, FusionMode, NullObserver, OrientationEngine, OrientationObserver,
    SensorAvailability,
};
pub use service::{OrientationService, RegistrationError, SensorEvent, SensorRegistry};
pub use types::{
    AccelSample, CompassStatus, DisplayRotation, GyroSample, HeadingSample, LocationFix,
    MagAccuracy, MagSample, OrientationState,
};
