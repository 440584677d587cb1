use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::services::ephemeris::{self, SolarGeometry};
use crate::services::irradiance::{self, ClearSkyIrradiance};

/// Orientation-independent inputs of the sweep, one entry per daytime instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meteorology {
    pub times: Vec<DateTime<Tz>>,
    pub solar_zenith: Vec<f64>,
    pub solar_azimuth: Vec<f64>,
    pub dni: Vec<f64>,
    pub ghi: Vec<f64>,
    pub dhi: Vec<f64>,
    pub dni_extra: Vec<f64>,
    /// Length of the grid the samples were drawn from, night included
    pub grid_len: usize,
}

impl Meteorology {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// The three solar capabilities the orientation search depends on.
///
/// Every call works on a whole batch of instants; the search asks for sun
/// geometry and clear-sky irradiance once per grid and only transposes per
/// orientation.
pub trait SolarModel {
    fn ephemeris(&self, times: &[DateTime<Tz>], site: &SiteParameters) -> Result<Vec<SolarGeometry>, SolarError>;

    /// Clear-sky components for `times`; `geometry` is the ephemeris of the same instants.
    fn clear_sky(
        &self,
        times: &[DateTime<Tz>],
        geometry: &[SolarGeometry],
        site: &SiteParameters,
    ) -> Result<Vec<ClearSkyIrradiance>, SolarError>;

    fn extraterrestrial_dni(&self, times: &[DateTime<Tz>]) -> Vec<f64>;

    /// Plane-of-array global irradiance at every sample of `met`.
    /// Entries may be NaN where the model has no defined value.
    fn transpose_to_plane(&self, tilt: f64, azimuth: f64, met: &Meteorology) -> Result<Vec<f64>, SolarError>;
}

/// SPA ephemeris, Ineichen clear sky and Hay-Davies transposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearSkyPvModel {
    pub linke_turbidity: f64,
    pub albedo: f64,
}

impl Default for ClearSkyPvModel {
    fn default() -> Self {
        Self { linke_turbidity: 3.0, albedo: 0.25 }
    }
}

impl SolarModel for ClearSkyPvModel {
    fn ephemeris(&self, times: &[DateTime<Tz>], site: &SiteParameters) -> Result<Vec<SolarGeometry>, SolarError> {
        ephemeris::ephemeris(times, site)
    }

    fn clear_sky(
        &self,
        times: &[DateTime<Tz>],
        geometry: &[SolarGeometry],
        site: &SiteParameters,
    ) -> Result<Vec<ClearSkyIrradiance>, SolarError> {
        if times.len() != geometry.len() {
            return Err(SolarError::Computation(format!(
                "clear-sky got {} instants but {} geometry samples",
                times.len(),
                geometry.len()
            )));
        }
        let pressure = irradiance::pressure_from_altitude(site.altitude);
        let sky = times
            .iter()
            .zip(geometry)
            .map(|(t, g)| {
                let airmass = irradiance::absolute_airmass(irradiance::relative_airmass(g.apparent_zenith), pressure);
                irradiance::ineichen(
                    g.apparent_zenith,
                    airmass,
                    self.linke_turbidity,
                    site.altitude,
                    irradiance::extraterrestrial_dni(t.ordinal()),
                )
            })
            .collect();
        Ok(sky)
    }

    fn extraterrestrial_dni(&self, times: &[DateTime<Tz>]) -> Vec<f64> {
        times.iter().map(|t| irradiance::extraterrestrial_dni(t.ordinal())).collect()
    }

    fn transpose_to_plane(&self, tilt: f64, azimuth: f64, met: &Meteorology) -> Result<Vec<f64>, SolarError> {
        let poa = (0..met.len())
            .map(|i| {
                let sky = ClearSkyIrradiance { dni: met.dni[i], ghi: met.ghi[i], dhi: met.dhi[i] };
                irradiance::total_irradiance(
                    tilt,
                    azimuth,
                    met.solar_zenith[i],
                    met.solar_azimuth[i],
                    sky,
                    met.dni_extra[i],
                    self.albedo,
                )
                .poa_global
            })
            .collect();
        Ok(poa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Ho_Chi_Minh;

    fn saigon() -> SiteParameters {
        SiteParameters::new(10.8231, 106.6297, 19.0, Ho_Chi_Minh, "TP. Hồ Chí Minh")
    }

    #[test]
    fn test_clear_sky_zero_at_night_positive_at_noon() {
        let model = ClearSkyPvModel::default();
        let times = vec![
            Ho_Chi_Minh.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
            Ho_Chi_Minh.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap(),
        ];
        let geometry = model.ephemeris(&times, &saigon()).unwrap();
        let sky = model.clear_sky(&times, &geometry, &saigon()).unwrap();
        assert_eq!(sky[0], ClearSkyIrradiance::default());
        assert!(sky[1].ghi > 700.0, "noon ghi {}", sky[1].ghi);
    }

    #[test]
    fn test_clear_sky_rejects_mismatched_geometry() {
        let model = ClearSkyPvModel::default();
        let times = vec![Ho_Chi_Minh.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()];
        let err = model.clear_sky(&times, &[], &saigon()).unwrap_err();
        assert!(matches!(err, SolarError::Computation(_)));
    }

    #[test]
    fn test_transpose_matches_sample_count() {
        let model = ClearSkyPvModel::default();
        let met = Meteorology {
            times: vec![Ho_Chi_Minh.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()],
            solar_zenith: vec![10.0],
            solar_azimuth: vec![180.0],
            dni: vec![900.0],
            ghi: vec![980.0],
            dhi: vec![95.0],
            dni_extra: vec![1360.0],
            grid_len: 24,
        };
        let poa = model.transpose_to_plane(10.0, 180.0, &met).unwrap();
        assert_eq!(poa.len(), 1);
        assert!(poa[0] > 900.0);
    }
}
