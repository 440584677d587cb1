//! Command-line interface: run the HTTP server or a one-off orientation sweep.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON configuration file
    #[arg(long, global = true, default_value = "config.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API (default)
    Serve,
    /// Find the best fixed orientation and print it
    Optimize(OptimizeArgs),
}

// ===================== OPTIMIZE =====================

/// Every option falls back to the configuration file when absent.
#[derive(Args, Debug, Default)]
pub struct OptimizeArgs {
    /// Calendar year to simulate (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
    /// Tilt sweep step in degrees
    #[arg(long, value_parser = parse_positive_f64)]
    pub tilt_step: Option<f64>,
    /// Largest tilt evaluated, in degrees (at most 90)
    #[arg(long, value_parser = parse_tilt_max)]
    pub tilt_max: Option<f64>,
    /// Azimuth sweep step in degrees
    #[arg(long, value_parser = parse_positive_f64)]
    pub azimuth_step: Option<f64>,
    /// Sampling frequency, e.g. "1h" or "30min"
    #[arg(long)]
    pub freq: Option<String>,

    /// Site latitude in decimal degrees (-90 to 90)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_latitude, requires = "lon")]
    pub lat: Option<f64>,
    /// Site longitude in decimal degrees (-180 to 180)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_longitude, requires = "lat")]
    pub lon: Option<f64>,
    /// Site altitude in metres (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub alt: Option<f64>,
    /// IANA timezone of the site
    #[arg(long)]
    pub tz: Option<String>,
}

// ===================== VALUE PARSERS =====================

fn parse_bounded(s: &str, name: &str, min: f64, max: f64) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("Invalid {}: {}", name, s))?;
    if !(min..=max).contains(&value) {
        return Err(format!("{} must be between {} and {}", name, min, max));
    }
    Ok(value)
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    parse_bounded(s, "latitude", -90.0, 90.0)
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    parse_bounded(s, "longitude", -180.0, 180.0)
}

fn parse_tilt_max(s: &str) -> Result<f64, String> {
    let value = parse_bounded(s, "tilt max", 0.0, 90.0)?;
    if value == 0.0 {
        return Err("tilt max must be positive".to_string());
    }
    Ok(value)
}

fn parse_positive_f64(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Value must be positive: {}", s));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["solar-mirror-optimizer"]).unwrap();
        assert_eq!(cli.config, "config.json");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_optimize_arguments() {
        let cli = Cli::try_parse_from([
            "solar-mirror-optimizer", "optimize",
            "--year", "2025", "--tilt-step", "2", "--azimuth-step", "10",
            "--lat", "-33.9", "--lon", "18.4", "--tz", "Africa/Johannesburg",
            "--config", "other.json",
        ])
        .unwrap();
        assert_eq!(cli.config, "other.json");
        let Some(Command::Optimize(args)) = cli.command else {
            panic!("expected optimize subcommand");
        };
        assert_eq!(args.year, Some(2025));
        assert_eq!(args.tilt_step, Some(2.0));
        assert_eq!(args.lat, Some(-33.9));
        assert_eq!(args.tz.as_deref(), Some("Africa/Johannesburg"));
        assert!(args.tilt_max.is_none());
    }

    #[test]
    fn test_optimize_rejects_bad_values() {
        assert!(Cli::try_parse_from(["x", "optimize", "--tilt-max", "120"]).is_err());
        assert!(Cli::try_parse_from(["x", "optimize", "--tilt-step", "0"]).is_err());
        assert!(Cli::try_parse_from(["x", "optimize", "--lat", "95", "--lon", "0"]).is_err());
        // lat without lon
        assert!(Cli::try_parse_from(["x", "optimize", "--lat", "10"]).is_err());
    }
}
