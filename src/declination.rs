//! Magnetic declination from a tilted-dipole model.
//!
//! Declination is approximated as the great-circle bearing from the site to
//! the geomagnetic north pole, which drifts a fraction of a degree per year.
//! Accuracy is within a couple of degrees at mid latitudes, which is plenty
//! for a handheld compass; a full spherical-harmonic field model is not
//! worth carrying here.

use crate::types::LocationFix;

// IGRF-13 geomagnetic north pole for epoch 2020.0 with its linear drift.
const POLE_LAT_2020: f64 = 80.65;
const POLE_LON_2020: f64 = -72.68;
const POLE_LAT_DRIFT_PER_YEAR: f64 = 0.05;
const POLE_LON_DRIFT_PER_YEAR: f64 = -0.18;
const EPOCH_2020_UNIX_MILLIS: i64 = 1_577_836_800_000;
const MILLIS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0 * 1000.0;

/// Declination in degrees, positive when magnetic north lies east of true
/// north. Altitude is accepted for interface symmetry but has a negligible
/// effect in a dipole model.
pub fn declination_degrees(
    latitude: f64,
    longitude: f64,
    _altitude_meters: f64,
    unix_millis: i64,
) -> f32 {
    let years = (unix_millis - EPOCH_2020_UNIX_MILLIS) as f64 / MILLIS_PER_YEAR;
    let pole_lat = (POLE_LAT_2020 + POLE_LAT_DRIFT_PER_YEAR * years).to_radians();
    let pole_lon = (POLE_LON_2020 + POLE_LON_DRIFT_PER_YEAR * years).to_radians();

    let lat = latitude.to_radians();
    let dlon = pole_lon - longitude.to_radians();

    // Initial great-circle bearing from the site to the pole.
    let y = dlon.sin() * pole_lat.cos();
    let x = lat.cos() * pole_lat.sin() - lat.sin() * pole_lat.cos() * dlon.cos();
    let bearing = y.atan2(x).to_degrees();

    // Bearing to the geomagnetic pole relative to true north IS the
    // declination in this model; keep it signed in (-180, 180].
    bearing as f32
}

/// Latest declination derived from location fixes. Starts at zero so heading
/// publication is never blocked waiting for a fix.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclinationCache {
    declination_degrees: f32,
    has_fix: bool,
}

impl DeclinationCache {
    pub fn update_from_fix(&mut self, fix: &LocationFix) {
        if !fix.latitude.is_finite() || !fix.longitude.is_finite() {
            return;
        }
        self.declination_degrees = declination_degrees(
            fix.latitude,
            fix.longitude,
            fix.altitude_meters,
            fix.timestamp_millis,
        );
        self.has_fix = true;
    }

    pub fn set_override(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.declination_degrees = degrees;
            self.has_fix = true;
        }
    }

    pub fn degrees(&self) -> f32 {
        self.declination_degrees
    }

    pub fn has_fix(&self) -> bool {
        self.has_fix
    }
}
