use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SNAPSHOT_EXTENSION: &str = ".json";

/// Parses a strict `YYYY-MM-DD` date.
///
/// chrono alone accepts short forms such as `25-1-1`, so the shape is checked
/// byte by byte before handing off. Anything that passes is also safe to use as
/// a file stem.
pub fn parse_snapshot_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Returns the date encoded in a snapshot file name (`YYYY-MM-DD.json`).
///
/// `template.json`, `mvps.json`, `players.json` and anything else that is not
/// a real calendar date yield `None`.
pub fn snapshot_date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    file_name
        .strip_suffix(SNAPSHOT_EXTENSION)
        .and_then(parse_snapshot_date)
}

pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{}{SNAPSHOT_EXTENSION}", date.format(DATE_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_dates() {
        assert_eq!(
            parse_snapshot_date("2025-11-12"),
            NaiveDate::from_ymd_opt(2025, 11, 12)
        );
    }

    #[test]
    fn rejects_short_forms_chrono_would_accept() {
        assert_eq!(parse_snapshot_date("25-1-1"), None);
        assert_eq!(parse_snapshot_date("2025-1-01"), None);
        assert_eq!(parse_snapshot_date("2025/11/12"), None);
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert_eq!(parse_snapshot_date("2025-02-30"), None);
        assert_eq!(parse_snapshot_date("2025-13-01"), None);
    }

    #[test]
    fn file_names_filter_auxiliary_files() {
        assert!(snapshot_date_from_file_name("template.json").is_none());
        assert!(snapshot_date_from_file_name("mvps.json").is_none());
        assert!(snapshot_date_from_file_name("players.json").is_none());
        assert!(snapshot_date_from_file_name("2025-11-12.json.bak").is_none());
        assert!(snapshot_date_from_file_name("../2025-11-12.json").is_none());
        assert_eq!(
            snapshot_date_from_file_name("2025-11-12.json"),
            NaiveDate::from_ymd_opt(2025, 11, 12)
        );
    }

    #[test]
    fn file_name_round_trips_through_date() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(snapshot_file_name(d), "2026-01-05.json");
    }
}
