// Date arithmetic for expiry tracking. Every function takes the reference
// date explicitly so callers (and tests) control "today"; nothing in here
// reads the wall clock.

use chrono::NaiveDate;

/// Products due within this many days count as "vencendo".
pub const EXPIRING_SOON_WINDOW: i64 = 7;

/// Lenient ISO date parse. Accepts plain `YYYY-MM-DD` as well as timestamp
/// strings (`2024-01-01T00:00:00Z`) written by other tools, in which case the
/// calendar-date prefix is used.
pub fn parse_expiry(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Signed whole days between `today` and the expiry date; negative means the
/// product is past its date. Unparseable input falls back to `0` so malformed
/// rows never break a listing.
pub fn days_until_expiry(expiry_date: &str, today: NaiveDate) -> i64 {
    match parse_expiry(expiry_date) {
        Some(expiry) => (expiry - today).num_days(),
        None => 0,
    }
}

pub fn is_expired(days: i64) -> bool {
    days < 0
}

pub fn is_expiring_soon(days: i64, window: i64) -> bool {
    days >= 0 && days <= window
}

/// Short human description of the remaining time.
pub fn expiry_description(days: i64) -> String {
    if days < 0 {
        let overdue = days.abs();
        if overdue == 1 {
            "Vencido há 1 dia".to_string()
        } else {
            format!("Vencido há {overdue} dias")
        }
    } else if days == 0 {
        "Vence hoje".to_string()
    } else if days == 1 {
        "Vence amanhã".to_string()
    } else {
        format!("{days} dias restantes")
    }
}

/// `dd/MM/yyyy` display format; unparseable values are echoed back.
pub fn format_expiry_date(value: &str) -> String {
    match parse_expiry(value) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

/// `dd/MM` short format used in report tables.
pub fn format_expiry_short(value: &str) -> String {
    match parse_expiry(value) {
        Some(date) => date.format("%d/%m").to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn counts_signed_days() {
        let today = date("2024-01-10");
        assert_eq!(days_until_expiry("2024-01-01", today), -9);
        assert_eq!(days_until_expiry("2024-01-10", today), 0);
        assert_eq!(days_until_expiry("2024-01-17", today), 7);
        assert_eq!(days_until_expiry("2024-02-10", today), 31);
    }

    #[test]
    fn accepts_timestamp_prefixes() {
        let today = date("2024-01-10");
        assert_eq!(days_until_expiry("2024-01-12T08:30:00+00:00", today), 2);
    }

    #[test]
    fn malformed_dates_fall_back_to_zero() {
        let today = date("2024-01-10");
        assert_eq!(days_until_expiry("not-a-date", today), 0);
        assert_eq!(days_until_expiry("", today), 0);
        assert_eq!(days_until_expiry("2024-13-40", today), 0);
    }

    #[test]
    fn expired_matches_negative_days() {
        for days in [-30, -1, 0, 1, 7, 8] {
            assert_eq!(is_expired(days), days < 0);
            assert_eq!(
                is_expiring_soon(days, EXPIRING_SOON_WINDOW),
                (0..=EXPIRING_SOON_WINDOW).contains(&days)
            );
        }
    }

    #[test]
    fn descriptions_pluralize() {
        assert_eq!(expiry_description(-2), "Vencido há 2 dias");
        assert_eq!(expiry_description(-1), "Vencido há 1 dia");
        assert_eq!(expiry_description(0), "Vence hoje");
        assert_eq!(expiry_description(1), "Vence amanhã");
        assert_eq!(expiry_description(5), "5 dias restantes");
    }

    #[test]
    fn formats_display_dates() {
        assert_eq!(format_expiry_date("2024-03-05"), "05/03/2024");
        assert_eq!(format_expiry_short("2024-03-05"), "05/03");
        assert_eq!(format_expiry_date("garbage"), "garbage");
    }
}
