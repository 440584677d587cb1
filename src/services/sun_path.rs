use chrono::{DateTime, NaiveDate, TimeDelta};
use chrono_tz::Tz;

use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::models::solar::{SunPath, SunPathPoint};
use crate::services::ephemeris::{ephemeris, sun_rise_set_transit};
use crate::services::time_grid::{local_midnight, sample_range};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn hh_mm(t: DateTime<Tz>, tz: Tz) -> String {
    t.with_timezone(&tz).format("%H:%M").to_string()
}

/// Sun track across one local day, sampled every `interval_minutes`, plus
/// the day's sunrise, solar noon and sunset.
///
/// Samples cover 24 elapsed hours from local midnight, end exclusive, so a
/// DST change shifts the local clock times of the later samples.
pub fn sun_path(date: NaiveDate, interval_minutes: i64, site: &SiteParameters) -> Result<SunPath, SolarError> {
    let step = TimeDelta::try_minutes(interval_minutes)
        .filter(|step| *step > TimeDelta::zero())
        .ok_or_else(|| SolarError::config("Interval must be a positive integer of minutes."))?;
    let tz = site.timezone;

    let start = local_midnight(tz, date)?;
    let times = sample_range(start, start + TimeDelta::days(1), step);
    let geometry = ephemeris(&times, site)?;

    let path = times
        .iter()
        .zip(&geometry)
        .map(|(t, g)| SunPathPoint {
            time: hh_mm(*t, tz),
            elevation: round2(g.apparent_elevation),
            azimuth: round2(g.azimuth),
        })
        .collect();

    let events = sun_rise_set_transit(date, site)?;

    Ok(SunPath {
        date: date.format("%Y-%m-%d").to_string(),
        timezone: tz.name().to_string(),
        location: site.clone(),
        sunrise: events.sunrise.map(|t| hh_mm(t, tz)),
        sunset: events.sunset.map(|t| hh_mm(t, tz)),
        solar_noon: Some(hh_mm(events.transit, tz)),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Ho_Chi_Minh;

    fn saigon() -> SiteParameters {
        SiteParameters::new(10.8231, 106.6297, 19.0, Ho_Chi_Minh, "TP. Hồ Chí Minh")
    }

    fn minutes(hh_mm: &str) -> i64 {
        let (h, m) = hh_mm.split_once(':').unwrap();
        h.parse::<i64>().unwrap() * 60 + m.parse::<i64>().unwrap()
    }

    #[test]
    fn test_hourly_path_and_events() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();
        let path = sun_path(date, 60, &saigon()).unwrap();

        assert_eq!(path.date, "2025-11-11");
        assert_eq!(path.timezone, "Asia/Ho_Chi_Minh");
        assert_eq!(path.path.len(), 24);
        assert_eq!(path.path[0].time, "00:00");
        assert_eq!(path.path[23].time, "23:00");

        assert!((minutes(path.sunrise.as_deref().unwrap()) - minutes("05:47")).abs() <= 1);
        assert!((minutes(path.sunset.as_deref().unwrap()) - minutes("17:27")).abs() <= 1);
        assert!((minutes(path.solar_noon.as_deref().unwrap()) - minutes("11:37")).abs() <= 1);

        let ten_am = path.path.iter().find(|p| p.time == "10:00").unwrap();
        assert!((ten_am.elevation - 52.87).abs() <= 0.2, "elevation {}", ten_am.elevation);
        assert!((ten_am.azimuth - 139.32).abs() <= 0.2, "azimuth {}", ten_am.azimuth);
    }

    #[test]
    fn test_custom_interval_and_site() {
        let hanoi = SiteParameters::new(21.0278, 105.8342, 10.0, chrono_tz::Asia::Bangkok, "Hà Nội");
        let date = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();
        let path = sun_path(date, 120, &hanoi).unwrap();
        assert_eq!(path.path.len(), 12);
        assert_eq!(path.location.name, "Hà Nội");
        assert!((path.location.latitude - 21.0278).abs() < 1e-4);
    }

    #[test]
    fn test_dst_day_spans_24_elapsed_hours() {
        let new_york = SiteParameters::new(40.7128, -74.0060, 10.0, chrono_tz::America::New_York, "New York");
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let path = sun_path(date, 60, &new_york).unwrap();
        assert_eq!(path.path.len(), 24);
        assert_eq!(path.path[1].time, "01:00");
        // 02:00 does not exist on the spring-forward day
        assert_eq!(path.path[2].time, "03:00");
        assert_eq!(path.path[23].time, "00:00");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();
        assert!(matches!(sun_path(date, 0, &saigon()), Err(SolarError::InvalidConfiguration(_))));
        assert!(sun_path(date, -15, &saigon()).is_err());
    }
}
