pub mod ephemeris;
pub mod irradiance;
pub mod orientation_optimizer;
pub mod solar_model;
pub mod sun_path;
pub mod time_grid;
