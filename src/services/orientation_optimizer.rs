//! Fixed-tilt orientation search.
//!
//! Clear-sky irradiance stands in for the long-term solar resource. Every
//! (tilt, azimuth) pair of the sweep is scored by the plane-of-array
//! irradiation it collects over one year and the best pair is reported.

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::models::solar::OrientationResult;
use crate::services::solar_model::{Meteorology, SolarModel};
use crate::services::time_grid::build_time_grid;

/// Upper bound accepted for the tilt sweep (vertical panel)
pub const MAX_TILT_DEG: f64 = 90.0;

/// Most (tilt, azimuth) candidates a single sweep may evaluate
pub const MAX_SWEEP_CANDIDATES: usize = 100_000;

/// Densest accepted sampling: one instant per minute over a leap year
pub const MAX_GRID_INSTANTS: i64 = 366 * 24 * 60;

// ─── Sweep configuration ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    pub tilt_step: f64,
    pub tilt_max: f64,
    pub azimuth_step: f64,
    pub frequency: TimeDelta,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            tilt_step: 1.0,
            tilt_max: 60.0,
            azimuth_step: 5.0,
            frequency: TimeDelta::hours(1),
        }
    }
}

impl OptimizerSettings {
    pub fn validate(&self) -> Result<(), SolarError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.tilt_step) || !positive(self.tilt_max) || !positive(self.azimuth_step) {
            return Err(SolarError::config("Step sizes and limits must be positive numbers."));
        }
        if self.tilt_max > MAX_TILT_DEG {
            return Err(SolarError::config("Tilt angle sweep should not exceed 90 degrees."));
        }
        if self.frequency <= TimeDelta::zero() {
            return Err(SolarError::config("Sampling frequency must be positive."));
        }

        // Sizes are checked in f64 before any axis or grid is allocated.
        let candidates = tilt_axis_len(self.tilt_step, self.tilt_max) * azimuth_axis_len(self.azimuth_step);
        if candidates > MAX_SWEEP_CANDIDATES as f64 {
            return Err(SolarError::config(format!(
                "Sweep of {:.0} orientations exceeds the limit of {}; use larger steps.",
                candidates, MAX_SWEEP_CANDIDATES
            )));
        }
        let instants = TimeDelta::days(366).num_milliseconds() / self.frequency.num_milliseconds().max(1);
        if instants > MAX_GRID_INSTANTS {
            return Err(SolarError::config("Sampling frequency must be at least one minute."));
        }
        Ok(())
    }
}

// The epsilon keeps `max_tilt` itself when it is a multiple of `step`.
fn tilt_axis_len(step: f64, max_tilt: f64) -> f64 {
    (max_tilt / step + 1e-9).floor() + 1.0
}

fn azimuth_axis_len(step: f64) -> f64 {
    (360.0 / step - 1e-9).ceil()
}

/// Tilts from 0° up to and including `max_tilt`.
pub fn default_tilt_range(step: f64, max_tilt: f64) -> Vec<f64> {
    let count = tilt_axis_len(step, max_tilt) as usize;
    (0..count).map(|i| i as f64 * step).collect()
}

/// Azimuths from 0° (North) up to but excluding 360°.
pub fn default_azimuth_range(step: f64) -> Vec<f64> {
    let count = azimuth_axis_len(step) as usize;
    (0..count).map(|i| i as f64 * step).collect()
}

/// Map any azimuth into [0, 360).
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

// ─── Meteorology ─────────────────────────────────────────────

/// Query the model once for the whole grid and keep only daytime samples
/// (apparent zenith below 90°).
pub fn prepare_meteorology<M: SolarModel + ?Sized>(
    model: &M,
    times: &[DateTime<Tz>],
    site: &SiteParameters,
) -> Result<Meteorology, SolarError> {
    let geometry = model.ephemeris(times, site)?;
    let clear_sky = model.clear_sky(times, &geometry, site)?;
    let dni_extra = model.extraterrestrial_dni(times);

    if geometry.len() != times.len() || clear_sky.len() != times.len() || dni_extra.len() != times.len() {
        return Err(SolarError::Computation(format!(
            "solar model returned {}/{}/{} samples for {} instants",
            geometry.len(),
            clear_sky.len(),
            dni_extra.len(),
            times.len()
        )));
    }

    let mut met = Meteorology { grid_len: times.len(), ..Default::default() };
    for (i, g) in geometry.iter().enumerate() {
        if g.apparent_zenith < 90.0 {
            met.times.push(times[i]);
            met.solar_zenith.push(g.apparent_zenith);
            met.solar_azimuth.push(g.azimuth);
            met.dni.push(clear_sky[i].dni);
            met.ghi.push(clear_sky[i].ghi);
            met.dhi.push(clear_sky[i].dhi);
            met.dni_extra.push(dni_extra[i]);
        }
    }

    if met.is_empty() {
        tracing::warn!("the sun never rises above the horizon at {} in the analysed window", site.name);
    } else {
        tracing::debug!("retained {} of {} instants with the sun above the horizon", met.len(), met.grid_len);
    }
    Ok(met)
}

// ─── Sweep & scoring ─────────────────────────────────────────

/// Sum of the defined samples; `None` when not a single sample is defined.
fn nan_tolerant_sum(values: &[f64]) -> Option<f64> {
    let mut defined = false;
    let mut total = 0.0;
    for &v in values.iter().filter(|v| v.is_finite()) {
        defined = true;
        total += v;
    }
    defined.then_some(total)
}

fn check_axis(name: &str, axis: &[f64]) -> Result<(), SolarError> {
    if axis.is_empty() {
        return Err(SolarError::config(format!("The {} range must contain at least one value.", name)));
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(SolarError::config(format!("The {} range must contain only finite angles.", name)));
    }
    Ok(())
}

/// Score every (tilt, azimuth) pair, tilt in the outer loop, and return the
/// best. Ties keep the pair seen first.
pub fn search_orientations<M: SolarModel + ?Sized>(
    model: &M,
    met: &Meteorology,
    tilt_range: &[f64],
    azimuth_range: &[f64],
) -> Result<OrientationResult, SolarError> {
    check_axis("tilt", tilt_range)?;
    check_axis("azimuth", azimuth_range)?;

    let mut best: Option<OrientationResult> = None;
    for &tilt in tilt_range {
        for &azimuth in azimuth_range {
            let azimuth = normalize_azimuth(azimuth);
            let poa = model.transpose_to_plane(tilt, azimuth, met)?;
            let Some(energy) = nan_tolerant_sum(&poa) else {
                continue;
            };
            if best.is_none_or(|b| energy > b.annual_poa_irradiance) {
                best = Some(OrientationResult { tilt, azimuth, annual_poa_irradiance: energy });
            }
        }
    }

    best.ok_or(SolarError::NoValidOrientation)
}

/// Best fixed orientation for `site` over calendar `year`.
///
/// Samples are summed as-is, so the energy is in Wh/m² for hourly sampling
/// and scales with the sampling interval otherwise.
pub fn optimize<M: SolarModel + ?Sized>(
    model: &M,
    site: &SiteParameters,
    year: i32,
    tilt_range: &[f64],
    azimuth_range: &[f64],
    frequency: TimeDelta,
) -> Result<OrientationResult, SolarError> {
    check_axis("tilt", tilt_range)?;
    check_axis("azimuth", azimuth_range)?;

    let times = build_time_grid(year, site.timezone, frequency)?;
    let met = prepare_meteorology(model, &times, site)?;
    let result = search_orientations(model, &met, tilt_range, azimuth_range)?;

    tracing::info!(
        "optimal orientation for {} ({}): tilt {:.1}°, azimuth {:.1}°, {:.1} kWh/m² over {} candidates",
        site.name,
        year,
        result.tilt,
        result.azimuth,
        result.annual_poa_irradiance / 1000.0,
        tilt_range.len() * azimuth_range.len()
    );
    Ok(result)
}

/// Run [`optimize`] on the default sweeps built from `settings`.
pub fn calculate_optimal_orientation<M: SolarModel + ?Sized>(
    model: &M,
    site: &SiteParameters,
    year: i32,
    settings: &OptimizerSettings,
) -> Result<OrientationResult, SolarError> {
    settings.validate()?;
    let tilts = default_tilt_range(settings.tilt_step, settings.tilt_max);
    let azimuths = default_azimuth_range(settings.azimuth_step);
    optimize(model, site, year, &tilts, &azimuths, settings.frequency)
}
