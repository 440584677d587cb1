use utoipa::OpenApi;
use crate::controllers::solar_controller;
use crate::models::{site, solar};
use crate::config;

#[derive(OpenApi)]
#[openapi(
    paths(
        solar_controller::list_sites,
        solar_controller::get_sun_position,
        solar_controller::get_sun_path,
        solar_controller::get_optimal_orientation
    ),
    components(
        schemas(
            config::SiteConfig,
            site::SiteParameters,
            solar::SunPositionResponse,
            solar::SunPath,
            solar::SunPathPoint,
            solar::OrientationPayload,
            solar::OptimalOrientationResponse
        )
    ),
    tags(
        (name = "solar-mirror-optimizer", description = "Sun position and panel orientation API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in ["/api/sites", "/api/sun-position", "/api/sun-path", "/api/optimal-orientation"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
