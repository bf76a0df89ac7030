use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AccelSample {
    pub timestamp_nanos: i64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GyroSample {
    pub timestamp_nanos: i64,
    /// Angular rate around each device axis, rad/s.
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MagSample {
    pub timestamp_nanos: i64,
    /// Field strength per device axis, µT.
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Reading from a platform-fused orientation sensor (rotation-vector style).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HeadingSample {
    pub timestamp_nanos: i64,
    pub magnetic_heading_degrees: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LocationFix {
    pub timestamp_millis: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_meters: f64,
}

impl AccelSample {
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl GyroSample {
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl MagSample {
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Magnetometer self-reported accuracy, ordered from worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MagAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}

/// Discrete display rotation reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl DisplayRotation {
    /// Remap the device X/Y sensor axes so they track the display's
    /// natural orientation. Z (screen normal) is unaffected.
    pub fn remap(self, v: Vector3<f32>) -> Vector3<f32> {
        match self {
            DisplayRotation::Deg0 => v,
            DisplayRotation::Deg90 => Vector3::new(v.y, -v.x, v.z),
            DisplayRotation::Deg180 => Vector3::new(-v.x, -v.y, v.z),
            DisplayRotation::Deg270 => Vector3::new(-v.y, v.x, v.z),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassStatus {
    Ok,
    NeedsCalibration,
    Interference,
}

/// Published orientation snapshot. Every `Available` field is replaced
/// wholesale on each emission; consumers never see partial updates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum OrientationState {
    Initializing,
    Available {
        /// True-north heading, always normalized to [0, 360).
        true_heading_degrees: f32,
        compass_status: CompassStatus,
        is_phone_flat: bool,
        is_phone_vertical: bool,
        phone_tilt_degrees: f32,
        should_show_calibration: bool,
    },
}
