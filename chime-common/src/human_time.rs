//! Clock label formatting for timer and player displays
//!
//! Timer durations are configured in decimal minutes (the reminder's
//! "data-time" attribute) and shown as zero-padded `MM:SS` labels.

/// Longest editable field value for minutes and seconds in the duration editor
pub const EDITOR_FIELD_MAX: u32 = 59;

/// Format whole seconds as a `MM:SS` label.
///
/// Minutes are not wrapped into hours; a 75 minute timer reads `75:00`.
///
/// # Examples
///
/// ```
/// use chime_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "00:00");
/// assert_eq!(format_clock(61), "01:01");
/// assert_eq!(format_clock(1200), "20:00");
/// ```
pub fn format_clock(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format fractional seconds as a `MM:SS` label, truncating sub-second parts.
///
/// Negative and non-finite values read as `00:00`.
///
/// ```
/// use chime_common::human_time::format_clock_secs_f64;
///
/// assert_eq!(format_clock_secs_f64(59.9), "00:59");
/// assert_eq!(format_clock_secs_f64(f64::NAN), "00:00");
/// ```
pub fn format_clock_secs_f64(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return format_clock(0);
    }
    format_clock(seconds.floor() as u64)
}

/// Convert a decimal minute duration into whole countdown seconds.
///
/// Rounds to the nearest second and never returns zero: a timer always
/// counts at least one tick.
///
/// ```
/// use chime_common::human_time::minutes_to_seconds;
///
/// assert_eq!(minutes_to_seconds(20.0), 1200);
/// assert_eq!(minutes_to_seconds(1.0 / 60.0), 1);
/// assert_eq!(minutes_to_seconds(0.0), 1);
/// ```
pub fn minutes_to_seconds(minutes: f64) -> u32 {
    if !minutes.is_finite() || minutes <= 0.0 {
        return 1;
    }
    let seconds = (minutes * 60.0).round();
    if seconds >= u32::MAX as f64 {
        u32::MAX
    } else {
        (seconds as u32).max(1)
    }
}

/// Split a decimal minute duration into display `(minutes, seconds)`.
pub fn split_minutes(minutes: f64) -> (u32, u32) {
    let total = minutes_to_seconds(minutes);
    (total / 60, total % 60)
}

/// Normalize editor input into a decimal minute duration.
///
/// Each field is clamped to `0..=59`; `0:00` is coerced to `0:01` so a
/// timer never runs with zero duration.
///
/// ```
/// use chime_common::human_time::editor_minutes;
///
/// assert_eq!(editor_minutes(0, 0), 1.0 / 60.0);
/// assert_eq!(editor_minutes(2, 30), 2.5);
/// ```
pub fn editor_minutes(minutes: u32, seconds: u32) -> f64 {
    let minutes = minutes.min(EDITOR_FIELD_MAX);
    let mut seconds = seconds.min(EDITOR_FIELD_MAX);
    if minutes == 0 && seconds == 0 {
        seconds = 1;
    }
    minutes as f64 + seconds as f64 / 60.0
}

/// Parse an `M:SS` (or bare minutes) editor string into `(minutes, seconds)`.
///
/// Fields are parsed leniently: empty or non-numeric parts read as zero,
/// mirroring how the inline editor treats blank inputs.
pub fn parse_editor_input(input: &str) -> (u32, u32) {
    let field = |s: &str| s.trim().parse::<u32>().unwrap_or(0);
    match input.split_once(':') {
        Some((m, s)) => (field(m), field(s)),
        None => (field(input), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(4500), "75:00");
    }

    #[test]
    fn test_format_clock_secs_f64_truncates() {
        assert_eq!(format_clock_secs_f64(0.4), "00:00");
        assert_eq!(format_clock_secs_f64(61.99), "01:01");
        assert_eq!(format_clock_secs_f64(-3.0), "00:00");
    }

    #[test]
    fn test_minutes_to_seconds_rounds() {
        assert_eq!(minutes_to_seconds(0.5), 30);
        // 1/3 minute is 20s after rounding the float product
        assert_eq!(minutes_to_seconds(1.0 / 3.0), 20);
        assert_eq!(minutes_to_seconds(-2.0), 1);
        assert_eq!(minutes_to_seconds(f64::INFINITY), 1);
    }

    #[test]
    fn test_split_minutes_never_shows_sixty_seconds() {
        // 0.99999 minutes rounds to a full minute rather than "00:60"
        assert_eq!(split_minutes(0.99999), (1, 0));
        assert_eq!(split_minutes(2.5), (2, 30));
    }

    #[test]
    fn test_editor_clamps_fields() {
        assert_eq!(editor_minutes(75, 80), 59.0 + 59.0 / 60.0);
        assert_eq!(minutes_to_seconds(editor_minutes(0, 0)), 1);
    }

    #[test]
    fn test_parse_editor_input() {
        assert_eq!(parse_editor_input("0:01"), (0, 1));
        assert_eq!(parse_editor_input("12:5"), (12, 5));
        assert_eq!(parse_editor_input("7"), (7, 0));
        assert_eq!(parse_editor_input(":"), (0, 0));
        assert_eq!(parse_editor_input("x:30"), (0, 30));
    }
}
