use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_port() -> u16 { 5000 }
fn default_static_dir() -> String { "frontend".to_string() }
fn default_tilt_step() -> f64 { 1.0 }
fn default_tilt_max() -> f64 { 60.0 }
fn default_azimuth_step() -> f64 { 5.0 }
fn default_freq() -> String { "1h".to_string() }
fn default_linke_turbidity() -> f64 { 3.0 }
fn default_albedo() -> f64 { 0.25 }
fn default_interval_minutes() -> i64 { 60 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub default_site: SiteConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub sun_path: SunPathConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served as the web front end
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, ToSchema)]
pub struct SiteConfig {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub timezone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            id: "hcm".to_string(),
            name: "TP. Hồ Chí Minh, Việt Nam".to_string(),
            latitude: 10.8231,
            longitude: 106.6297,
            altitude: 19.0,
            timezone: "Asia/Ho_Chi_Minh".to_string(),
        }
    }
}

/// Sweep resolution and clear-sky assumptions used when a request does not override them.
#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    #[serde(default = "default_tilt_step")]
    pub tilt_step: f64,
    #[serde(default = "default_tilt_max")]
    pub tilt_max: f64,
    #[serde(default = "default_azimuth_step")]
    pub azimuth_step: f64,
    #[serde(default = "default_freq")]
    pub freq: String,
    #[serde(default = "default_linke_turbidity")]
    pub linke_turbidity: f64,
    #[serde(default = "default_albedo")]
    pub albedo: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            tilt_step: default_tilt_step(),
            tilt_max: default_tilt_max(),
            azimuth_step: default_azimuth_step(),
            freq: default_freq(),
            linke_turbidity: default_linke_turbidity(),
            albedo: default_albedo(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SunPathConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,
}

impl Default for SunPathConfig {
    fn default() -> Self {
        Self { interval_minutes: default_interval_minutes() }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    /// A file that exists and fails to parse is still an error.
    pub fn load_or_default(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if !std::path::Path::new(path).exists() {
            tracing::warn!("{} not found, using built-in defaults", path);
            return Ok(Config::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "server": { "port": 8080 } }"#).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.static_dir, "frontend");
        assert_eq!(cfg.optimizer.tilt_max, 60.0);
        assert_eq!(cfg.optimizer.freq, "1h");
        assert_eq!(cfg.default_site.timezone, "Asia/Ho_Chi_Minh");
        assert!(cfg.sites.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_or_default("does/not/exist.json").unwrap();
        assert_eq!(cfg.sun_path.interval_minutes, 60);
        assert_eq!(cfg.optimizer.albedo, 0.25);
    }

    #[test]
    fn test_shipped_config_parses() {
        let cfg = Config::load("config.json").unwrap();
        assert_eq!(cfg.sites.len(), 2);
        assert_eq!(cfg.sites[1].id, "hanoi");
        assert_eq!(cfg.server.port, 5000);
    }
}
