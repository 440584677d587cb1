use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono_tz::Tz;

use crate::config::Config;
use crate::errors::SolarError;
use crate::models::site::{parse_timezone, SiteParameters};
use crate::services::solar_model::ClearSkyPvModel;

/// Timezones memoised per identifier. Entries are never evicted, so once
/// the table is full new identifiers are simply resolved without caching.
const TIMEZONE_CACHE_CAPACITY: usize = 16;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Site used when a request carries no location parameters
    pub default_site: SiteParameters,
    pub model: ClearSkyPvModel,
    timezones: Arc<RwLock<HashMap<String, Tz>>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, SolarError> {
        let default_site = SiteParameters::try_from(&config.default_site)?;
        let model = ClearSkyPvModel {
            linke_turbidity: config.optimizer.linke_turbidity,
            albedo: config.optimizer.albedo,
        };
        Ok(Self {
            config: Arc::new(config),
            default_site,
            model,
            timezones: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn resolve_timezone(&self, name: &str) -> Result<Tz, SolarError> {
        if let Ok(map) = self.timezones.read() {
            if let Some(tz) = map.get(name) {
                return Ok(*tz);
            }
        }

        let tz = parse_timezone(name)?;
        if let Ok(mut map) = self.timezones.write() {
            if map.len() < TIMEZONE_CACHE_CAPACITY {
                map.insert(name.to_string(), tz);
            }
        }
        Ok(tz)
    }

    #[cfg(test)]
    fn cached_timezones(&self) -> usize {
        self.timezones.read().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_site_resolved_from_config() {
        let state = AppState::new(Config::default()).unwrap();
        assert_eq!(state.default_site.timezone, chrono_tz::Asia::Ho_Chi_Minh);
        assert_eq!(state.model.albedo, 0.25);
    }

    #[test]
    fn test_invalid_default_timezone_fails() {
        let mut config = Config::default();
        config.default_site.timezone = "Not/AZone".to_string();
        assert!(matches!(AppState::new(config), Err(SolarError::UnknownTimezone(_))));
    }

    #[test]
    fn test_timezone_cache_is_bounded_and_stays_correct() {
        let state = AppState::new(Config::default()).unwrap();
        let names: Vec<&str> = chrono_tz::TZ_VARIANTS.iter().take(40).map(|tz| tz.name()).collect();
        for name in &names {
            assert_eq!(state.resolve_timezone(name).unwrap().name(), *name);
        }
        assert_eq!(state.cached_timezones(), TIMEZONE_CACHE_CAPACITY);
        // Cached and uncached lookups agree
        for name in &names {
            assert_eq!(state.resolve_timezone(name).unwrap().name(), *name);
        }
        assert!(state.resolve_timezone("Atlantis/Lost").is_err());
    }
}
