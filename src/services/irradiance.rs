/// ============================================================
///  Clear-sky irradiance & plane-of-array transposition
///
///  Algorithm pipeline:
///   1. Extraterrestrial irradiance – eccentricity-corrected solar constant
///                                    (Spencer 1971)
///   2. Air mass  – Kasten & Young (1989), pressure corrected from altitude
///   3. Clear-sky model – Ineichen / Perez with a Linke turbidity factor:
///                        DNI, GHI, DHI on the horizontal plane
///   4. Transposition   – beam on the angle of incidence, Hay & Davies
///                        sky diffuse, isotropic ground reflection
/// ============================================================

use std::f64::consts::PI;

// ─── Physical constants ──────────────────────────────────────
const SC: f64 = 1366.1; // Solar constant W/m²
const P0: f64 = 101_325.0; // Sea-level standard pressure, Pa
/// Lower bound on cos(zenith) in the Hay-Davies beam ratio (cos 89°)
const MIN_COS_ZENITH: f64 = 0.01745;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearSkyIrradiance {
    /// Direct normal irradiance, W/m²
    pub dni: f64,
    /// Global horizontal irradiance, W/m²
    pub ghi: f64,
    /// Diffuse horizontal irradiance, W/m²
    pub dhi: f64,
}

/// Irradiance components striking a tilted surface (W/m²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoaIrradiance {
    pub poa_global: f64,
    pub poa_direct: f64,
    pub poa_sky_diffuse: f64,
    pub poa_ground_diffuse: f64,
}

// ─── 1. Extraterrestrial irradiance ──────────────────────────

/// Extraterrestrial normal irradiance for a 1-based day of year.
pub fn extraterrestrial_dni(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (day_of_year as f64 - 1.0) / 365.0;
    SC * (1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin())
}

// ─── 2. Air mass ─────────────────────────────────────────────

/// Mean atmospheric pressure (Pa) at `altitude_m`, ISA troposphere.
pub fn pressure_from_altitude(altitude_m: f64) -> f64 {
    P0 * (1.0 - 2.25577e-5 * altitude_m).powf(5.25588)
}

/// Kasten & Young (1989) relative air mass. NaN once the sun is below the horizon.
pub fn relative_airmass(zenith_deg: f64) -> f64 {
    if zenith_deg > 90.0 {
        return f64::NAN;
    }
    1.0 / (zenith_deg.to_radians().cos() + 0.50572 * (6.07995 + (90.0 - zenith_deg)).powf(-1.6364))
}

pub fn absolute_airmass(relative: f64, pressure_pa: f64) -> f64 {
    relative * pressure_pa / P0
}

// ─── 3. Clear-sky model (Ineichen & Perez 2002) ──────────────

/// Clear-sky irradiance for one instant.
///
/// * `apparent_zenith_deg` – refraction corrected solar zenith
/// * `airmass_absolute` – pressure corrected air mass
/// * `linke_turbidity` – atmospheric turbidity (2 very clear … 6 hazy)
/// * `altitude_m` – site altitude
/// * `dni_extra` – extraterrestrial normal irradiance
///
/// Undefined intermediate values (sun below the horizon) collapse to zero.
pub fn ineichen(
    apparent_zenith_deg: f64,
    airmass_absolute: f64,
    linke_turbidity: f64,
    altitude_m: f64,
    dni_extra: f64,
) -> ClearSkyIrradiance {
    let tl = linke_turbidity;
    let cos_zenith = apparent_zenith_deg.to_radians().cos().max(0.0);

    let fh1 = (-altitude_m / 8000.0).exp();
    let fh2 = (-altitude_m / 1250.0).exp();
    let cg1 = 5.09e-5 * altitude_m + 0.868;
    let cg2 = 3.92e-5 * altitude_m + 0.0387;

    let ghi = (-cg2 * airmass_absolute * (fh1 + fh2 * (tl - 1.0))).exp();
    let ghi = cg1 * dni_extra * cos_zenith * ghi.max(0.0);

    let b = 0.664 + 0.163 / fh1;
    let bnci = dni_extra * (b * (-0.09 * airmass_absolute * (tl - 1.0)).exp()).max(0.0);

    // DNI cannot exceed what GHI leaves room for
    let bnci_2 = (1.0 - (0.1 - 0.2 * (-tl).exp()) / (0.1 + 0.882 / fh1)) / cos_zenith;
    let bnci_2 = ghi * bnci_2.clamp(0.0, 1e20);

    let dni = bnci.min(bnci_2);
    let dhi = ghi - dni * cos_zenith;

    let zero_nan = |v: f64| if v.is_nan() { 0.0 } else { v };
    ClearSkyIrradiance {
        dni: zero_nan(dni),
        ghi: zero_nan(ghi),
        dhi: zero_nan(dhi),
    }
}

// ─── 4. Transposition ────────────────────────────────────────

/// Cosine of the angle between the sun and the surface normal (may be negative).
pub fn aoi_projection(surface_tilt: f64, surface_azimuth: f64, solar_zenith: f64, solar_azimuth: f64) -> f64 {
    let tilt = surface_tilt.to_radians();
    let zenith = solar_zenith.to_radians();
    let projection = zenith.cos() * tilt.cos()
        + zenith.sin() * tilt.sin() * (solar_azimuth - surface_azimuth).to_radians().cos();
    projection.clamp(-1.0, 1.0)
}

/// Hay & Davies (1980) sky diffuse irradiance on a tilted surface.
///
/// The anisotropy index `dni / dni_extra` splits the diffuse dome into a
/// circumsolar part, projected like beam, and an isotropic remainder.
#[allow(clippy::too_many_arguments)]
pub fn hay_davies_sky_diffuse(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    dni: f64,
    dni_extra: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let cos_tt = aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth).max(0.0);
    let cos_solar_zenith = solar_zenith.to_radians().cos();
    let rb = cos_tt / cos_solar_zenith.max(MIN_COS_ZENITH);

    let ai = dni / dni_extra;
    let view_factor = 0.5 * (1.0 + surface_tilt.to_radians().cos());

    let isotropic = (dhi * (1.0 - ai) * view_factor).max(0.0);
    let circumsolar = (dhi * ai * rb).max(0.0);
    isotropic + circumsolar
}

/// Total plane-of-array irradiance for one instant.
#[allow(clippy::too_many_arguments)]
pub fn total_irradiance(
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    sky: ClearSkyIrradiance,
    dni_extra: f64,
    albedo: f64,
) -> PoaIrradiance {
    let projection = aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth);
    let poa_direct = (sky.dni * projection).max(0.0);

    let poa_sky_diffuse = hay_davies_sky_diffuse(
        surface_tilt,
        surface_azimuth,
        sky.dhi,
        sky.dni,
        dni_extra,
        solar_zenith,
        solar_azimuth,
    );
    let poa_ground_diffuse = sky.ghi * albedo * (1.0 - surface_tilt.to_radians().cos()) * 0.5;

    PoaIrradiance {
        poa_global: poa_direct + poa_sky_diffuse + poa_ground_diffuse,
        poa_direct,
        poa_sky_diffuse,
        poa_ground_diffuse,
    }
}
