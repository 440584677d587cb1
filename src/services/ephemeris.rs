//! Solar ephemeris backed by the NREL SPA implementation in `solar-positioning`.
//!
//! Refraction is corrected for the mean pressure at the site altitude and a
//! fixed 12 °C air temperature, so elevations and zeniths are apparent values.

use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use solar_positioning::{
    spa,
    time::DeltaT,
    types::{RefractionCorrection, SunriseResult},
    Horizon,
};

use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::models::solar::SunPosition;
use crate::services::irradiance::pressure_from_altitude;
use crate::services::time_grid::local_midnight;

/// Annual mean air temperature assumed for refraction (°C)
const REFRACTION_TEMPERATURE_C: f64 = 12.0;

/// Unrounded sun geometry for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarGeometry {
    pub apparent_zenith: f64,
    pub apparent_elevation: f64,
    /// Degrees from North, clockwise
    pub azimuth: f64,
}

/// Sunrise, solar transit and sunset for one local day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunEvents {
    pub sunrise: Option<DateTime<Tz>>,
    pub transit: DateTime<Tz>,
    pub sunset: Option<DateTime<Tz>>,
}

fn refraction_for(site: &SiteParameters) -> Result<RefractionCorrection, SolarError> {
    let pressure_hpa = pressure_from_altitude(site.altitude) / 100.0;
    Ok(RefractionCorrection::new(pressure_hpa, REFRACTION_TEMPERATURE_C)?)
}

/// Sun geometry at every instant of `times`, in order.
pub fn ephemeris(times: &[DateTime<Tz>], site: &SiteParameters) -> Result<Vec<SolarGeometry>, SolarError> {
    let refraction = Some(refraction_for(site)?);

    // ΔT only moves by fractions of a second per year; estimate it once per month.
    let mut delta_t_month: Option<((i32, u32), f64)> = None;

    let mut geometry = Vec::with_capacity(times.len());
    for &t in times {
        let key = (t.year(), t.month());
        let delta_t = match delta_t_month {
            Some((month, value)) if month == key => value,
            _ => {
                let value = DeltaT::estimate_from_date(key.0, key.1)?;
                delta_t_month = Some((key, value));
                value
            }
        };

        let pos = spa::solar_position(t, site.latitude, site.longitude, site.altitude, delta_t, refraction)?;
        let elevation = pos.elevation_angle();
        geometry.push(SolarGeometry {
            apparent_zenith: 90.0 - elevation,
            apparent_elevation: elevation,
            azimuth: pos.azimuth(),
        });
    }
    Ok(geometry)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sun position at a single instant, angles rounded to 0.01°.
pub fn sun_position(when: DateTime<Tz>, site: &SiteParameters) -> Result<SunPosition, SolarError> {
    let geometry = ephemeris(&[when], site)?;
    let g = geometry
        .first()
        .ok_or_else(|| SolarError::Computation("ephemeris returned no sample".to_string()))?;
    Ok(SunPosition {
        timestamp: when,
        elevation: round2(g.apparent_elevation),
        azimuth: round2(g.azimuth),
        zenith: round2(g.apparent_zenith),
    })
}

/// Sunrise, transit and sunset on `date` at the site, using the standard
/// −0.8333° horizon. Polar day and polar night only report the transit.
pub fn sun_rise_set_transit(date: NaiveDate, site: &SiteParameters) -> Result<SunEvents, SolarError> {
    let midnight = local_midnight(site.timezone, date)?;
    let delta_t = DeltaT::estimate_from_date(date.year(), date.month())?;
    let result = spa::sunrise_sunset_for_horizon(
        midnight,
        site.latitude,
        site.longitude,
        delta_t,
        Horizon::SunriseSunset,
    )?;

    Ok(match result {
        SunriseResult::RegularDay { sunrise, transit, sunset } => SunEvents {
            sunrise: Some(sunrise),
            transit,
            sunset: Some(sunset),
        },
        SunriseResult::AllDay { transit } | SunriseResult::AllNight { transit } => SunEvents {
            sunrise: None,
            transit,
            sunset: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::Asia::Ho_Chi_Minh;

    fn saigon() -> SiteParameters {
        SiteParameters::new(10.8231, 106.6297, 19.0, Ho_Chi_Minh, "TP. Hồ Chí Minh")
    }

    fn minutes_of_day(t: DateTime<Tz>) -> i64 {
        let local = t.with_timezone(&Ho_Chi_Minh);
        local.hour() as i64 * 60 + local.minute() as i64
    }

    #[test]
    fn test_mid_morning_equinox_position() {
        let when = Ho_Chi_Minh.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        let pos = sun_position(when, &saigon()).unwrap();
        assert!((pos.elevation - 43.74).abs() <= 0.2, "elevation {}", pos.elevation);
        assert!((pos.azimuth - 100.70).abs() <= 0.2, "azimuth {}", pos.azimuth);
        assert!(pos.is_daytime());
    }

    #[test]
    fn test_afternoon_position() {
        let when = Ho_Chi_Minh.with_ymd_and_hms(2025, 11, 11, 14, 0, 0).unwrap();
        let pos = sun_position(when, &saigon()).unwrap();
        assert!((pos.elevation - 44.84).abs() <= 0.2, "elevation {}", pos.elevation);
        assert!((pos.azimuth - 231.55).abs() <= 0.2, "azimuth {}", pos.azimuth);
    }

    #[test]
    fn test_zenith_complements_elevation() {
        let when = Ho_Chi_Minh.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap();
        let g = ephemeris(&[when], &saigon()).unwrap()[0];
        assert!((g.apparent_zenith + g.apparent_elevation - 90.0).abs() < 1e-9);
        assert!((0.0..360.0).contains(&g.azimuth));
    }

    #[test]
    fn test_midnight_is_night() {
        let when = Ho_Chi_Minh.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let pos = sun_position(when, &saigon()).unwrap();
        assert!(!pos.is_daytime());
        assert!(pos.zenith > 90.0);
    }

    #[test]
    fn test_sun_events_november() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();
        let events = sun_rise_set_transit(date, &saigon()).unwrap();
        let sunrise = minutes_of_day(events.sunrise.unwrap());
        let sunset = minutes_of_day(events.sunset.unwrap());
        let noon = minutes_of_day(events.transit);
        assert!((sunrise - (5 * 60 + 47)).abs() <= 1, "sunrise {}", sunrise);
        assert!((sunset - (17 * 60 + 27)).abs() <= 1, "sunset {}", sunset);
        assert!((noon - (11 * 60 + 37)).abs() <= 1, "noon {}", noon);
    }

    #[test]
    fn test_polar_night_has_no_sunrise() {
        let tromso = SiteParameters::new(69.6492, 18.9553, 10.0, chrono_tz::Europe::Oslo, "Tromsø");
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        let events = sun_rise_set_transit(date, &tromso).unwrap();
        assert!(events.sunrise.is_none());
        assert!(events.sunset.is_none());
    }
}
