//! Human-readable time intervals for log diagnostics.

const UNITS: &[(u64, &str, &str)] = &[
    (31_536_000, "year", "years"),
    (2_592_000, "month", "months"),
    (604_800, "week", "weeks"),
    (86_400, "day", "days"),
    (3_600, "hour", "hours"),
    (60, "min", "min"),
    (1, "sec", "sec"),
];

/// Number of units kept in a formatted interval.
const GRANULARITY: usize = 2;

/// Format a non-negative number of seconds, e.g. `1 hour 5 min`.
pub fn format_interval(secs: u64) -> String {
    let mut remaining = secs;
    let mut parts = Vec::with_capacity(GRANULARITY);

    for &(size, singular, plural) in UNITS {
        if remaining >= size {
            let count = remaining / size;
            remaining %= size;
            let label = if count == 1 { singular } else { plural };
            parts.push(format!("{} {}", count, label));
        }
        if parts.len() == GRANULARITY {
            break;
        }
    }

    if parts.is_empty() {
        "0 sec".to_string()
    } else {
        parts.join(" ")
    }
}

/// Format a signed difference with an explicit `+`/`-` prefix.
pub fn format_signed_interval(diff: i64) -> String {
    let sign = if diff < 0 { '-' } else { '+' };
    format!("{}{}", sign, format_interval(diff.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval_zero() {
        assert_eq!(format_interval(0), "0 sec");
    }

    #[test]
    fn test_format_interval_granularity() {
        assert_eq!(format_interval(1), "1 sec");
        assert_eq!(format_interval(903), "15 min 3 sec");
        // Seconds are dropped once two units are used
        assert_eq!(format_interval(3_600 + 300 + 7), "1 hour 5 min");
        assert_eq!(format_interval(2 * 86_400 + 3_600), "2 days 1 hour");
    }

    #[test]
    fn test_format_signed_interval() {
        assert_eq!(format_signed_interval(-900), "-15 min");
        assert_eq!(format_signed_interval(61), "+1 min 1 sec");
        assert_eq!(format_signed_interval(0), "+0 sec");
    }

    #[test]
    fn test_format_extreme_differences() {
        assert_eq!(
            format_signed_interval(i64::MIN),
            "-292471208677 years 6 months"
        );
        assert_eq!(
            format_signed_interval(i64::MAX),
            "+292471208677 years 6 months"
        );
    }
}
