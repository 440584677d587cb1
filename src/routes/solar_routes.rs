use axum::{routing::get, Router};
use crate::controllers::solar_controller::{
    get_optimal_orientation, get_sun_path, get_sun_position, list_sites,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/sites",               get(list_sites))
        .route("/sun-position",        get(get_sun_position))
        .route("/sun-path",            get(get_sun_path))
        .route("/optimal-orientation", get(get_optimal_orientation))
        .with_state(state)
}
