//! Literal tables: duration units and calendar-unit names.

/// Duration units accepted in time-interval constants, singular and plural.
pub const TIME_UNITS: &[&str] = &[
    "millisecond",
    "milliseconds",
    "second",
    "seconds",
    "minute",
    "minutes",
    "hour",
    "hours",
    "day",
    "days",
    "week",
    "weeks",
    "month",
    "months",
    "year",
    "years",
];

/// Calendar-unit names: string literals accepted where a `chrono_literal`
/// parameter is expected (e.g. the first argument of `date_extract`).
pub const CALENDAR_UNITS: &[&str] = &[
    "ALIGNED_DAY_OF_WEEK_IN_MONTH",
    "ALIGNED_DAY_OF_WEEK_IN_YEAR",
    "ALIGNED_WEEK_OF_MONTH",
    "ALIGNED_WEEK_OF_YEAR",
    "AMPM_OF_DAY",
    "CLOCK_HOUR_OF_AMPM",
    "CLOCK_HOUR_OF_DAY",
    "DAY_OF_MONTH",
    "DAY_OF_WEEK",
    "DAY_OF_YEAR",
    "EPOCH_DAY",
    "ERA",
    "HOUR_OF_AMPM",
    "HOUR_OF_DAY",
    "INSTANT_SECONDS",
    "MICRO_OF_DAY",
    "MICRO_OF_SECOND",
    "MILLI_OF_DAY",
    "MILLI_OF_SECOND",
    "MINUTE_OF_DAY",
    "MINUTE_OF_HOUR",
    "MONTH_OF_YEAR",
    "NANO_OF_DAY",
    "NANO_OF_SECOND",
    "OFFSET_SECONDS",
    "PROLEPTIC_MONTH",
    "SECOND_OF_DAY",
    "SECOND_OF_MINUTE",
    "YEAR",
    "YEAR_OF_ERA",
];

pub fn is_time_unit(unit: &str) -> bool {
    let lowered = unit.to_ascii_lowercase();
    TIME_UNITS.contains(&lowered.as_str())
}

/// Calendar-unit names are matched verbatim, with or without surrounding
/// string quotes.
pub fn is_calendar_unit(text: &str) -> bool {
    let trimmed = text.trim_matches('"');
    CALENDAR_UNITS.contains(&trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_units_cover_singular_and_plural() {
        assert!(is_time_unit("year"));
        assert!(is_time_unit("Years"));
        assert!(!is_time_unit("fortnight"));
    }

    #[test]
    fn calendar_units_ignore_string_quotes() {
        assert!(is_calendar_unit("\"DAY_OF_WEEK\""));
        assert!(is_calendar_unit("DAY_OF_WEEK"));
        assert!(!is_calendar_unit("DAY_OF_NOTHING"));
    }
}
