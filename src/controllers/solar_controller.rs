use axum::{
    extract::{FromRequestParts, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::models::solar::{
    OptimalOrientationResponse, OrientationPayload, OrientationQuery, OrientationResult, SiteQuery,
    SunPath, SunPathQuery, SunPositionQuery, SunPositionResponse,
};
use crate::services::ephemeris::sun_position;
use crate::services::orientation_optimizer::{calculate_optimal_orientation, OptimizerSettings};
use crate::services::sun_path::sun_path;
use crate::services::time_grid::parse_frequency;
use crate::shared_state::AppState;

const CUSTOM_SITE_NAME: &str = "Custom Location";

const COMPASS_LABELS: [&str; 8] = [
    "North",
    "North-East",
    "East",
    "South-East",
    "South",
    "South-West",
    "West",
    "North-West",
];

// ─── Request helpers ─────────────────────────────────────────

/// `Query` whose rejection is reported as a JSON `SolarError` body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(SolarError))]
pub struct ApiQuery<T>(pub T);

/// Build the requested site, or the default one when no location parameter is present.
fn site_from_query(query: &SiteQuery, state: &AppState) -> Result<SiteParameters, SolarError> {
    if query.is_empty() {
        return Ok(state.default_site.clone());
    }
    let (Some(latitude), Some(longitude)) = (query.lat, query.lon) else {
        return Err(SolarError::config(
            "Latitude (lat) and longitude (lon) must be provided for custom locations.",
        ));
    };

    let default = &state.default_site;
    let altitude = query.alt.or(query.altitude).unwrap_or(default.altitude);
    let timezone = match query.tz.as_deref() {
        Some(name) => state.resolve_timezone(name)?,
        None => default.timezone,
    };
    let name = query.name.clone().unwrap_or_else(|| CUSTOM_SITE_NAME.to_string());

    let site = SiteParameters::new(latitude, longitude, altitude, timezone, name);
    site.validate()?;
    Ok(site)
}

/// ISO-8601 with or without an offset; naive values are read in the site zone.
fn parse_datetime(value: &str, tz: Tz) -> Result<DateTime<Tz>, SolarError> {
    const INVALID: &str = "Invalid datetime format. Use ISO-8601 e.g. 2025-11-11T14:00:00+07:00";

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&tz));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| SolarError::InvalidDate(INVALID.to_string()))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| SolarError::InvalidDate(format!("{} does not exist in {}", value, tz)))
}

fn parse_date(value: &str) -> Result<NaiveDate, SolarError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| SolarError::InvalidDate("Invalid date format. Use YYYY-MM-DD.".to_string()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn direction_label(azimuth: f64) -> &'static str {
    let normalized = azimuth.rem_euclid(360.0);
    let idx = (((normalized + 22.5) % 360.0) / 45.0).floor() as usize;
    COMPASS_LABELS[idx.min(COMPASS_LABELS.len() - 1)]
}

fn orientation_payload(result: &OrientationResult, site: &SiteParameters) -> OrientationPayload {
    OrientationPayload {
        tilt: round2(result.tilt),
        azimuth: round2(result.azimuth),
        direction_label: direction_label(result.azimuth).to_string(),
        annual_poa_kwh_m2: round2(result.annual_poa_irradiance / 1000.0),
        site: site.clone(),
    }
}

// ─── Handlers ────────────────────────────────────────────────

/// GET /api/sites
/// List the configured site presets
#[utoipa::path(
    get,
    path = "/api/sites",
    responses(
        (status = 200, description = "Configured site presets", body = Vec<SiteConfig>)
    )
)]
pub async fn list_sites(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.sites.clone()).into_response()
}

/// GET /api/sun-position
/// Sun position at a given time
///
/// Returns the apparent elevation, azimuth and zenith for the requested
/// instant (default: now) at the requested or default site.
#[utoipa::path(
    get,
    path = "/api/sun-position",
    params(SunPositionQuery, SiteQuery),
    responses(
        (status = 200, description = "Sun position", body = SunPositionResponse),
        (status = 400, description = "Invalid datetime or location")
    )
)]
pub async fn get_sun_position(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SunPositionQuery>,
    ApiQuery(site_query): ApiQuery<SiteQuery>,
) -> Result<Json<SunPositionResponse>, SolarError> {
    let site = site_from_query(&site_query, &state)?;
    let when = match params.datetime.as_deref() {
        Some(value) if !value.is_empty() => parse_datetime(value, site.timezone)?,
        _ => Utc::now().with_timezone(&site.timezone),
    };
    let position = sun_position(when, &site)?;
    Ok(Json(SunPositionResponse::new(&position, &site)))
}

/// GET /api/sun-path
/// Sun path over one day
///
/// Samples the sun every `interval` minutes from local midnight and reports
/// sunrise, solar noon and sunset.
#[utoipa::path(
    get,
    path = "/api/sun-path",
    params(SunPathQuery, SiteQuery),
    responses(
        (status = 200, description = "Sun path for the day", body = SunPath),
        (status = 400, description = "Invalid date, interval or location")
    )
)]
pub async fn get_sun_path(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SunPathQuery>,
    ApiQuery(site_query): ApiQuery<SiteQuery>,
) -> Result<Json<SunPath>, SolarError> {
    let site = site_from_query(&site_query, &state)?;
    let date = match params.date.as_deref() {
        Some(value) if !value.is_empty() => parse_date(value)?,
        _ => Utc::now().with_timezone(&site.timezone).date_naive(),
    };
    let interval = params.interval.unwrap_or(state.config.sun_path.interval_minutes);
    Ok(Json(sun_path(date, interval, &site)?))
}

/// GET /api/optimal-orientation
/// Best fixed panel orientation for a year
///
/// Sweeps tilt and azimuth over a clear-sky year and returns the
/// orientation collecting the most plane-of-array irradiation.
#[utoipa::path(
    get,
    path = "/api/optimal-orientation",
    params(OrientationQuery, SiteQuery),
    responses(
        (status = 200, description = "Optimal orientation", body = OptimalOrientationResponse),
        (status = 400, description = "Invalid sweep configuration or location"),
        (status = 500, description = "No orientation could be evaluated")
    )
)]
pub async fn get_optimal_orientation(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<OrientationQuery>,
    ApiQuery(site_query): ApiQuery<SiteQuery>,
) -> Result<Json<OptimalOrientationResponse>, SolarError> {
    let site = site_from_query(&site_query, &state)?;
    let defaults = &state.config.optimizer;

    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let freq = params.freq.clone().unwrap_or_else(|| defaults.freq.clone());
    let settings = OptimizerSettings {
        tilt_step: params.tilt_step.unwrap_or(defaults.tilt_step),
        tilt_max: params.tilt_max.unwrap_or(defaults.tilt_max),
        azimuth_step: params.azimuth_step.unwrap_or(defaults.azimuth_step),
        frequency: parse_frequency(&freq)?,
    };
    settings.validate()?;

    tracing::info!(
        "optimizing orientation for {} ({}): tilt step {}°, max {}°, azimuth step {}°, freq {}",
        site.name, year, settings.tilt_step, settings.tilt_max, settings.azimuth_step, freq
    );

    // The sweep is CPU bound; keep it off the async workers.
    let model = state.model;
    let sweep_site = site.clone();
    let result = tokio::task::spawn_blocking(move || {
        calculate_optimal_orientation(&model, &sweep_site, year, &settings)
    })
    .await
    .map_err(|e| SolarError::Computation(e.to_string()))??;

    Ok(Json(OptimalOrientationResponse {
        year,
        tilt_step: settings.tilt_step,
        tilt_max: settings.tilt_max,
        azimuth_step: settings.azimuth_step,
        freq,
        orientation: orientation_payload(&result, &site),
    }))
}
