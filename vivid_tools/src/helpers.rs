use chrono::{DateTime, NaiveDate, NaiveDateTime};

const US_DATE: &str = "%m/%d/%Y";
const ISO_DATE: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Vivid Seats is not consistent about how event dates are written. This accepts ISO dates, ISO date-times (with or
/// without an offset) and US-style `mm/dd/yyyy` dates with an optional trailing time.
///
/// Returns `None` for anything else. A date-time with an offset yields the date at the venue, not in the local zone.
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, ISO_DATE) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = NAIVE_DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(value, f).ok()) {
        return Some(dt.date());
    }
    let first_token = value.split_whitespace().next().unwrap_or_default();
    NaiveDate::parse_from_str(first_token, US_DATE).ok()
}
