use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format an amount as US dollars, e.g. `$1,234.50` or `-$3.00`
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount < 0.0 { "-$∞".to_string() } else { "$∞".to_string() };
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, dollars, cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a distance given in kilometers.
/// Under 1 km shows rounded meters (`850m`), otherwise one decimal (`2.5km`).
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{}m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{:.1}km", distance_km)
    }
}

/// Format a timestamp from the API for display in the local timezone
pub fn format_time(date: &str) -> String {
    format_time_in(date, &Local)
}

/// Format a timestamp for display in the given timezone.
///
/// Accepts RFC 3339 timestamps and offset-less `YYYY-MM-DDTHH:MM:SS`
/// (interpreted in `tz`). Anything else renders as `Invalid Date`.
pub fn format_time_in<Tz>(date: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(date.trim()) {
        return dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string();
    }

    let naive = NaiveDateTime::parse_from_str(date.trim(), "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(date.trim(), "%Y-%m-%d %H:%M:%S%.f"));
    match naive.ok().and_then(|n| tz.from_local_datetime(&n).earliest()) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => "Invalid Date".to_string(),
    }
}
