use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::SiteConfig;
use crate::errors::SolarError;

/// Immutable description of an observation site.
///
/// The timezone is stored already resolved, so anything holding a
/// `SiteParameters` can rely on it naming a known zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SiteParameters {
    /// Geographic latitude in degrees (−90 … +90)
    pub latitude: f64,
    /// Geographic longitude in degrees (−180 … +180)
    pub longitude: f64,
    /// Altitude above sea level in metres (may be negative)
    pub altitude: f64,
    #[schema(value_type = String, example = "Asia/Ho_Chi_Minh")]
    pub timezone: Tz,
    pub name: String,
}

impl SiteParameters {
    pub fn new(latitude: f64, longitude: f64, altitude: f64, timezone: Tz, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            timezone,
            name: name.into(),
        }
    }

    /// Reject coordinates outside the geographic ranges.
    pub fn validate(&self) -> Result<(), SolarError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SolarError::config("Latitude must be between -90 and 90 degrees."));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SolarError::config("Longitude must be between -180 and 180 degrees."));
        }
        if !self.altitude.is_finite() {
            return Err(SolarError::config("Altitude must be a finite number of metres."));
        }
        Ok(())
    }
}

impl TryFrom<&SiteConfig> for SiteParameters {
    type Error = SolarError;

    fn try_from(cfg: &SiteConfig) -> Result<Self, Self::Error> {
        let timezone = parse_timezone(&cfg.timezone)?;
        let site = SiteParameters::new(cfg.latitude, cfg.longitude, cfg.altitude, timezone, cfg.name.clone());
        site.validate()?;
        Ok(site)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, SolarError> {
    name.parse::<Tz>()
        .map_err(|_| SolarError::UnknownTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_from_config() {
        let cfg = SiteConfig {
            id: "hanoi".into(),
            name: "Hà Nội".into(),
            latitude: 21.0278,
            longitude: 105.8342,
            altitude: 10.0,
            timezone: "Asia/Bangkok".into(),
        };
        let site = SiteParameters::try_from(&cfg).unwrap();
        assert_eq!(site.timezone, chrono_tz::Asia::Bangkok);
        assert_eq!(site.name, "Hà Nội");
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        assert!(matches!(parse_timezone("Nowhere/Atlantis"), Err(SolarError::UnknownTimezone(_))));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let site = SiteParameters::new(91.0, 0.0, 0.0, chrono_tz::UTC, "Bad");
        assert!(matches!(site.validate(), Err(SolarError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_timezone_serializes_as_name() {
        let site = SiteParameters::new(10.0, 106.0, 5.0, chrono_tz::Asia::Ho_Chi_Minh, "HCM");
        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["timezone"], "Asia/Ho_Chi_Minh");
    }
}
