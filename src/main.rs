mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod errors;
mod cli;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use chrono::{Datelike, Utc};
use clap::Parser;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::cli::{Cli, Command, OptimizeArgs};
use crate::config::Config;
use crate::errors::SolarError;
use crate::models::site::SiteParameters;
use crate::routes::solar_routes::api_routes;
use crate::services::orientation_optimizer::{calculate_optimal_orientation, OptimizerSettings};
use crate::services::time_grid::parse_frequency;
use crate::shared_state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // 1. Load configuration
    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Configuration loaded: {} site presets", config.sites.len());

    // 2. Initialize shared state
    let state = match AppState::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid default site: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::Optimize(args) => {
            if let Err(e) = run_optimize(&state, &args) {
                tracing::error!("Optimization failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

// ─── serve ───────────────────────────────────────────────────

async fn serve(state: AppState) {
    let server_port = state.config.server.port;
    let static_dir = state.config.server.static_dir.clone();

    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    tracing::info!("API Server listening on http://{}", addr);
    tracing::info!("Scalar UI: http://{}/scalar", addr);
    tracing::info!("Static files served from {}", static_dir);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        tracing::error!("HTTP server error: {}", e);
    }
}

// ─── optimize ────────────────────────────────────────────────

fn run_optimize(state: &AppState, args: &OptimizeArgs) -> Result<(), SolarError> {
    let defaults = &state.config.optimizer;
    let site = cli_site(state, args)?;

    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let freq = args.freq.clone().unwrap_or_else(|| defaults.freq.clone());
    let settings = OptimizerSettings {
        tilt_step: args.tilt_step.unwrap_or(defaults.tilt_step),
        tilt_max: args.tilt_max.unwrap_or(defaults.tilt_max),
        azimuth_step: args.azimuth_step.unwrap_or(defaults.azimuth_step),
        frequency: parse_frequency(&freq)?,
    };

    let result = calculate_optimal_orientation(&state.model, &site, year, &settings)?;
    println!(
        "Optimal tilt: {:.1}°, azimuth: {:.1}° (annual POA ≈ {:.1} kWh/m²)",
        result.tilt,
        result.azimuth,
        result.annual_poa_irradiance / 1000.0
    );
    Ok(())
}

/// Site from `--lat/--lon`, completed from the configured default site.
fn cli_site(state: &AppState, args: &OptimizeArgs) -> Result<SiteParameters, SolarError> {
    let default = &state.default_site;
    let (Some(latitude), Some(longitude)) = (args.lat, args.lon) else {
        return Ok(default.clone());
    };
    let timezone = match args.tz.as_deref() {
        Some(name) => state.resolve_timezone(name)?,
        None => default.timezone,
    };
    let site = SiteParameters::new(
        latitude,
        longitude,
        args.alt.unwrap_or(default.altitude),
        timezone,
        format!("{:.4}, {:.4}", latitude, longitude),
    );
    site.validate()?;
    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(Config::default()).unwrap()
    }

    #[test]
    fn test_cli_site_defaults_to_configured_site() {
        let site = cli_site(&state(), &OptimizeArgs::default()).unwrap();
        assert_eq!(site.timezone, chrono_tz::Asia::Ho_Chi_Minh);
        assert_eq!(site.latitude, 10.8231);
    }

    #[test]
    fn test_cli_site_override() {
        let args = OptimizeArgs {
            lat: Some(-33.9249),
            lon: Some(18.4241),
            tz: Some("Africa/Johannesburg".into()),
            ..Default::default()
        };
        let site = cli_site(&state(), &args).unwrap();
        assert_eq!(site.timezone, chrono_tz::Africa::Johannesburg);
        assert_eq!(site.altitude, 19.0);
        assert_eq!(site.name, "-33.9249, 18.4241");
    }

    #[test]
    fn test_run_optimize_rejects_bad_frequency() {
        let args = OptimizeArgs { freq: Some("weekly".into()), ..Default::default() };
        assert!(matches!(run_optimize(&state(), &args), Err(SolarError::InvalidConfiguration(_))));
    }
}
