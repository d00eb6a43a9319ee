use std::time::Duration;

use hwstats_core::{Reader, ReaderKind};

use super::FactoryOptions;
use crate::format;

pub fn run(
    options: &FactoryOptions<'_>,
    kind: &str,
    interval: f64,
    count: Option<usize>,
    json: bool,
) {
    let kind: ReaderKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let pause = match parse_interval(interval) {
        Ok(pause) => pause,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let factory = super::make_factory(options);
    let unit = factory.config().temperature_unit;
    let mut reader = factory.create(kind);

    let mut taken = 0usize;
    while count.is_none_or(|n| taken < n) {
        if taken > 0 {
            std::thread::sleep(pause);
        }
        taken += 1;

        let mut delivered = false;
        reader.read(|snapshot| {
            delivered = true;
            if json {
                match serde_json::to_string(&snapshot) {
                    Ok(line) => println!("{line}"),
                    Err(e) => eprintln!("Error: {kind}: {e}"),
                }
            } else {
                print!("{}", format::render(&snapshot, unit));
            }
        });
        if !delivered {
            log::debug!("{kind}: read {taken} produced no snapshot");
        }
    }
}

/// Seconds between reads as a `Duration`.
pub fn parse_interval(seconds: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("--interval must be a non-negative number of seconds, got {seconds}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_accepts_fractions() {
        assert_eq!(parse_interval(1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_interval(0.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_interval_rejects_out_of_range() {
        assert!(parse_interval(-1.0).is_err());
        assert!(parse_interval(f64::NAN).is_err());
        assert!(parse_interval(f64::INFINITY).is_err());
        assert!(parse_interval(1e300).unwrap_err().contains("--interval"));
    }
}
