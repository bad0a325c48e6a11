use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Captures, Regex};

/// Only the top of the document is searched for a date.
const DATE_SEARCH_LINES: usize = 5;

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// 2025-08-18
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());

/// January 30, 2025 / Jan 30th 2025
static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

/// 18 Aug 2025 / 18th of August, 2025
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}\.?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

/// Finds the first complete calendar date (day, month and year) near the top
/// of a document. The time is fixed at 12:00 UTC so the result does not
/// depend on the local timezone.
pub fn extract_date(markdown: &str) -> Option<DateTime<Utc>> {
    let head = markdown
        .lines()
        .take(DATE_SEARCH_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let iso = ISO_DATE.captures_iter(&head).filter_map(|caps| {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        Some((start(&caps), date))
    });
    let month_first = MONTH_DAY_YEAR.captures_iter(&head).filter_map(|caps| {
        let date = NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            month_number(&caps[1])?,
            caps[2].parse().ok()?,
        )?;
        Some((start(&caps), date))
    });
    let day_first = DAY_MONTH_YEAR.captures_iter(&head).filter_map(|caps| {
        let date = NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            month_number(&caps[2])?,
            caps[1].parse().ok()?,
        )?;
        Some((start(&caps), date))
    });

    iso.chain(month_first)
        .chain(day_first)
        .min_by_key(|(offset, _)| *offset)
        .and_then(|(_, date)| date.and_hms_opt(12, 0, 0))
        .map(|dt| dt.and_utc())
}

fn start(caps: &Captures) -> usize {
    caps.get(0).map_or(usize::MAX, |m| m.start())
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(markdown: &str) -> Option<String> {
        extract_date(markdown).map(|d| d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }

    #[test]
    fn test_iso_date() {
        let md = "# Hello world\n  This document was published on 2025-01-30";
        assert_eq!(iso(md).as_deref(), Some("2025-01-30T12:00:00.000Z"));
    }

    #[test]
    fn test_first_date_wins() {
        let md = "# Hello world\n  This document was published on April 30 2024 and not on March 1 2021";
        assert_eq!(iso(md).as_deref(), Some("2024-04-30T12:00:00.000Z"));
    }

    #[test]
    fn test_month_day_comma_year() {
        assert_eq!(
            iso("Published January 30, 2017").as_deref(),
            Some("2017-01-30T12:00:00.000Z")
        );
    }

    #[test]
    fn test_day_abbreviated_month_year() {
        assert_eq!(iso("18 Aug 2025").as_deref(), Some("2025-08-18T12:00:00.000Z"));
    }

    #[test]
    fn test_partial_dates_are_ignored() {
        assert!(extract_date("# Update Spring 2025\n\nDear investors,\n").is_none());
        assert!(extract_date(
            "# Local currencies\n\nEver since the movie came out in 2015, we've seen an explosion."
        )
        .is_none());
    }

    #[test]
    fn test_only_first_lines_are_searched() {
        let md = "a\nb\nc\nd\ne\nPublished on 2020-02-02";
        assert!(extract_date(md).is_none());
    }

    #[test]
    fn test_invalid_calendar_date_is_skipped() {
        assert!(extract_date("Due 2024-02-31").is_none());
        assert_eq!(
            iso("Due 2024-02-31, moved to Feb 28 2024").as_deref(),
            Some("2024-02-28T12:00:00.000Z")
        );
    }
}
