use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::site::SiteParameters;

// ─── Sun geometry ────────────────────────────────────────────────────────────

/// One sun-position sample, angles rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct SunPosition {
    pub timestamp: DateTime<Tz>,
    /// Apparent (refraction corrected) elevation in degrees
    pub elevation: f64,
    /// Degrees from North, clockwise
    pub azimuth: f64,
    /// Apparent zenith in degrees
    pub zenith: f64,
}

impl SunPosition {
    pub fn is_daytime(&self) -> bool {
        self.elevation > 0.0
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SunPositionResponse {
    /// ISO-8601 timestamp in the site timezone
    pub timestamp: String,
    pub elevation: f64,
    pub azimuth: f64,
    pub zenith: f64,
    pub is_daytime: bool,
    pub location: SiteParameters,
}

impl SunPositionResponse {
    pub fn new(position: &SunPosition, site: &SiteParameters) -> Self {
        Self {
            timestamp: position.timestamp.to_rfc3339(),
            elevation: position.elevation,
            azimuth: position.azimuth,
            zenith: position.zenith,
            is_daytime: position.is_daytime(),
            location: site.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SunPathPoint {
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    pub elevation: f64,
    pub azimuth: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SunPath {
    /// `YYYY-MM-DD`
    pub date: String,
    pub timezone: String,
    pub location: SiteParameters,
    /// `HH:MM`, absent during polar day or night
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub solar_noon: Option<String>,
    pub path: Vec<SunPathPoint>,
}

// ─── Orientation search ──────────────────────────────────────────────────────

/// Best fixed orientation found by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct OrientationResult {
    /// Degrees from horizontal (0 = flat)
    pub tilt: f64,
    /// Degrees from North, clockwise, always in [0, 360)
    pub azimuth: f64,
    /// Plane-of-array irradiation summed over the analysed grid (Wh/m²)
    pub annual_poa_irradiance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrientationPayload {
    pub tilt: f64,
    pub azimuth: f64,
    /// Eight-point compass label of the facing direction
    pub direction_label: String,
    pub annual_poa_kwh_m2: f64,
    pub site: SiteParameters,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptimalOrientationResponse {
    pub year: i32,
    pub tilt_step: f64,
    pub tilt_max: f64,
    pub azimuth_step: f64,
    pub freq: String,
    pub orientation: OrientationPayload,
}

// ─── Query parameters ────────────────────────────────────────────────────────

/// Optional custom location. When every field is absent the default site is used.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SiteQuery {
    /// Latitude in decimal degrees
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    pub lon: Option<f64>,
    /// Altitude in metres
    pub alt: Option<f64>,
    /// Alias of `alt`
    pub altitude: Option<f64>,
    /// IANA timezone identifier
    pub tz: Option<String>,
    pub name: Option<String>,
}

impl SiteQuery {
    pub fn is_empty(&self) -> bool {
        self.lat.is_none()
            && self.lon.is_none()
            && self.alt.is_none()
            && self.altitude.is_none()
            && self.tz.is_none()
            && self.name.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SunPositionQuery {
    /// ISO-8601 datetime, e.g. 2025-11-11T14:00:00+07:00 (defaults to now)
    pub datetime: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SunPathQuery {
    /// `YYYY-MM-DD` (defaults to today at the site)
    pub date: Option<String>,
    /// Sampling interval in minutes
    pub interval: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrientationQuery {
    pub year: Option<i32>,
    pub tilt_step: Option<f64>,
    pub tilt_max: Option<f64>,
    pub azimuth_step: Option<f64>,
    /// Sampling frequency, e.g. `1h`, `30min`
    pub freq: Option<String>,
}
