use super::*;

// 2024-01-15T10:30:00Z
const SAMPLE: i64 = 1_705_314_600;

#[test]
fn start_of_day_floors_to_midnight() {
    assert_eq!(start_of_day(SAMPLE), 1_705_276_800);
    assert_eq!(start_of_day(1_705_276_800), 1_705_276_800);
}

#[test]
fn parse_date_returns_midnight_epoch() {
    assert_eq!(parse_date("2024-01-15"), Ok(1_705_276_800));
    assert_eq!(parse_date(" 1970-01-01 "), Ok(0));
}

#[test]
fn parse_date_rejects_other_formats() {
    assert_eq!(parse_date("15/01/2024"), Err(ValidationError::InvalidDate));
    assert_eq!(parse_date("2024-02-30"), Err(ValidationError::InvalidDate));
    assert_eq!(parse_date(""), Err(ValidationError::InvalidDate));
}

#[test]
fn format_date_day_month_year() {
    assert_eq!(format_date(Some(SAMPLE)), "15/01/2024");
}

#[test]
fn format_date_missing_is_dash() {
    assert_eq!(format_date(None), "-");
    assert_eq!(format_date(Some(0)), "-");
}

#[test]
fn format_iso_date_round_trips_parse() {
    assert_eq!(format_iso_date(1_705_276_800), "2024-01-15");
}

#[test]
fn clock_hour_reads_leading_component() {
    assert_eq!(clock_hour("08:59:59"), Some(8));
    assert_eq!(clock_hour("9:00"), Some(9));
    assert_eq!(clock_hour("late"), None);
    assert_eq!(clock_hour("25:00"), None);
}

#[test]
fn is_late_from_nine() {
    assert!(!is_late("08:59"));
    assert!(is_late("09:00"));
    assert!(!is_late(""));
}

#[test]
fn work_duration_same_day() {
    assert_eq!(work_duration("08:15", "17:45").as_deref(), Some("9j 30m"));
}

#[test]
fn work_duration_overnight_wraps() {
    assert_eq!(work_duration("22:00", "06:30").as_deref(), Some("8j 30m"));
}

#[test]
fn work_duration_missing_clock() {
    assert_eq!(work_duration("08:00", ""), None);
}

#[test]
fn work_duration_rejects_out_of_range_clock() {
    assert_eq!(work_duration("9223372036854775807:00", "17:00"), None);
    assert_eq!(work_duration("08:00", "24:00"), None);
    assert_eq!(work_duration("08:75", "17:00"), None);
}
