// Turns the raw text produced by the OCR provider into a usable expiry date.
// The imaging pipeline itself lives client-side; we only ever see its string.

use std::sync::OnceLock;

use regex::Regex;

use crate::services::expiry::parse_expiry;

/// Finds the first `DD/MM/YYYY`-style date (also `-` or `.` separators, and
/// 2-digit years, which are assumed to be 20xx) in recognized text and
/// returns it as ISO `YYYY-MM-DD`. Impossible dates and pattern misses both
/// yield `None`; a miss is "no suggestion", never an error.
pub fn extract_expiry_date(text: &str) -> Option<String> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(\d{2})[/\-.](\d{2})[/\-.](\d{4})").expect("date pattern"),
            Regex::new(r"(\d{2})[/\-.](\d{2})[/\-.](\d{2})").expect("date pattern"),
        ]
    });

    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            let day = &caps[1];
            let month = &caps[2];
            let year = if caps[3].len() == 2 {
                format!("20{}", &caps[3])
            } else {
                caps[3].to_string()
            };

            let iso = format!("{year}-{month}-{day}");
            if parse_expiry(&iso).is_some() {
                return Some(iso);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_full_year_dates() {
        assert_eq!(
            extract_expiry_date("VAL 25/12/2024 LOTE 1234"),
            Some("2024-12-25".to_string())
        );
        assert_eq!(
            extract_expiry_date("venc: 01-03-2025"),
            Some("2025-03-01".to_string())
        );
        assert_eq!(
            extract_expiry_date("05.06.2024"),
            Some("2024-06-05".to_string())
        );
    }

    #[test]
    fn expands_two_digit_years() {
        assert_eq!(
            extract_expiry_date("VAL 25/12/24"),
            Some("2024-12-25".to_string())
        );
    }

    #[test]
    fn rejects_impossible_dates_and_misses() {
        assert_eq!(extract_expiry_date("VAL 99/99/2024"), None);
        assert_eq!(extract_expiry_date("sem data nenhuma"), None);
        assert_eq!(extract_expiry_date(""), None);
    }
}
