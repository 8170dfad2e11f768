use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Layouts tried when an RFC-822 date carries no zone, or a zone name chrono
/// does not know (`JST`). Such dates are read as UTC.
const ZONELESS_FORMATS: [&str; 4] = [
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M",
];

/// Normalizes an RSS `pubDate` to ISO-8601 UTC.
///
/// `Mon, 15 Jan 2024 10:30:00 +0900` becomes `2024-01-15T01:30:00+00:00`.
/// Anything that is not an RFC-822 date, including dates that are already
/// ISO-8601, is returned unchanged.
pub fn rfc822_to_iso8601(raw: &str) -> String {
    match parse_rfc822(raw) {
        Some(dt) => format_utc(&dt),
        None => raw.to_string(),
    }
}

fn parse_rfc822(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    parse_zoneless(trimmed).or_else(|| parse_zoneless(strip_zone_name(trimmed)?))
}

fn parse_zoneless(raw: &str) -> Option<DateTime<Utc>> {
    ZONELESS_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `raw` without a trailing alphabetic zone token, if it has one.
fn strip_zone_name(raw: &str) -> Option<&str> {
    let (rest, zone) = raw.rsplit_once(char::is_whitespace)?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(rest.trim_end())
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Current time as ISO-8601 UTC with microsecond precision, used to stamp
/// each snapshot.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
