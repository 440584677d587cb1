use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::errors::SolarError;

/// Local midnight starting `date` in `tz`.
///
/// When midnight falls in a DST gap the first valid instant after it is
/// used; when it is ambiguous the earlier of the two readings wins.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> Result<DateTime<Tz>, SolarError> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SolarError::InvalidDate(format!("no midnight on {}", date)))?;

    // Gaps are at most a couple of hours; probe forward in 15 minute steps.
    (0..=12)
        .map(|k| midnight + TimeDelta::minutes(15 * k))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or_else(|| SolarError::InvalidDate(format!("{} has no local midnight in {}", date, tz)))
}

fn start_of_year(year: i32, tz: Tz) -> Result<DateTime<Tz>, SolarError> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| SolarError::config(format!("Year {} is out of range.", year)))?;
    local_midnight(tz, date)
}

/// Evenly spaced instants covering one calendar year in `tz`.
///
/// Starts at local midnight on January 1st of `year` (inclusive) and stops
/// before local midnight on January 1st of `year + 1` (exclusive). Spacing is
/// an absolute duration, so DST transitions do not distort it.
pub fn build_time_grid(year: i32, tz: Tz, frequency: TimeDelta) -> Result<Vec<DateTime<Tz>>, SolarError> {
    if frequency <= TimeDelta::zero() {
        return Err(SolarError::config("Sampling frequency must be positive."));
    }
    let start = start_of_year(year, tz)?;
    let end = start_of_year(year + 1, tz)?;
    Ok(sample_range(start, end, frequency))
}

/// Half-open `[start, end)` range stepped by `step`; `step` must be positive.
pub(crate) fn sample_range(start: DateTime<Tz>, end: DateTime<Tz>, step: TimeDelta) -> Vec<DateTime<Tz>> {
    let span_ms = (end - start).num_milliseconds().max(0);
    let step_ms = step.num_milliseconds().max(1);
    let mut times = Vec::with_capacity((span_ms / step_ms + 1) as usize);

    let mut t = start;
    while t < end {
        times.push(t);
        t += step;
    }
    times
}

/// Parse a sampling frequency such as `1h`, `30min`, `15T`, `90s` or `1D`.
/// A bare unit means one of it.
pub fn parse_frequency(freq: &str) -> Result<TimeDelta, SolarError> {
    let freq = freq.trim();
    let split = freq
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(freq.len());
    let (count, unit) = freq.split_at(split);

    let count: i64 = if count.is_empty() {
        1
    } else {
        count
            .parse()
            .map_err(|_| SolarError::config(format!("Invalid sampling frequency '{}'.", freq)))?
    };

    let delta = match unit {
        "h" | "H" => TimeDelta::try_hours(count),
        "min" | "T" => TimeDelta::try_minutes(count),
        "s" | "S" => TimeDelta::try_seconds(count),
        "D" | "d" => TimeDelta::try_days(count),
        _ => None,
    }
    .ok_or_else(|| SolarError::config(format!("Invalid sampling frequency '{}'.", freq)))?;

    if delta <= TimeDelta::zero() {
        return Err(SolarError::config("Sampling frequency must be positive."));
    }
    Ok(delta)
}
