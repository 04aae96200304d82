use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// How the execution controller learns that a running task unit finished.
///
/// - `Signal`: each unit reports its own completion over a channel as soon as
///   it returns (default).
/// - `Poll`: the executor checks liveness of every running unit on a fixed
///   interval and reports the ones that have finished. Timing resolution is
///   bounded by the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WakeupMode {
    #[default]
    Signal,
    Poll,
}

impl FromStr for WakeupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signal" => Ok(WakeupMode::Signal),
            "poll" => Ok(WakeupMode::Poll),
            other => Err(format!(
                "invalid wakeup mode: {other} (expected \"signal\" or \"poll\")"
            )),
        }
    }
}

/// Default wall-clock length of one duration unit.
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

/// Default liveness polling interval for [`WakeupMode::Poll`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts a number of abstract duration units to wall-clock time.
///
/// Exact for every `u64` count; saturates at `Duration::MAX`.
pub fn units_to_duration(units: u64, unit: Duration) -> Duration {
    let nanos = unit.as_nanos().saturating_mul(u128::from(units));
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

/// Converts wall-clock time back to (fractional) duration units.
pub fn duration_to_units(elapsed: Duration, unit: Duration) -> f64 {
    if unit.is_zero() {
        return 0.0;
    }
    elapsed.as_secs_f64() / unit.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wakeup_mode_parses_case_insensitively() {
        assert_eq!("Poll".parse::<WakeupMode>(), Ok(WakeupMode::Poll));
        assert_eq!(" signal ".parse::<WakeupMode>(), Ok(WakeupMode::Signal));
        assert!("spin".parse::<WakeupMode>().is_err());
    }

    #[test]
    fn unit_conversion() {
        let unit = Duration::from_millis(250);
        assert_eq!(units_to_duration(4, unit), Duration::from_secs(1));
        assert!((duration_to_units(Duration::from_millis(500), unit) - 2.0).abs() < 1e-9);
        assert_eq!(duration_to_units(Duration::from_secs(3), Duration::ZERO), 0.0);
    }

    #[test]
    fn large_unit_counts_are_not_truncated() {
        let units = u64::from(u32::MAX) + 10;
        assert_eq!(
            units_to_duration(units, Duration::from_millis(1)),
            Duration::from_millis(units)
        );
        assert_eq!(
            units_to_duration(units, Duration::from_millis(1500)),
            Duration::from_millis(units * 1500)
        );
        assert_eq!(units_to_duration(u64::MAX, Duration::from_secs(2)), Duration::MAX);
    }
}
