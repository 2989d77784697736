use std::fmt::Display;

use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate,
    format::{Item, StrftimeItems},
};

use crate::{
    error::{TsError, TsResult},
    utils::text::is_ascii_digits,
};

/// Canonical date form used by the exchange query parameters and merged rows.
pub static YMD_FORMAT: &str = "%Y%m%d";

static ROC_YEAR_OFFSET: i32 = 1911;

/// Inclusive calendar window of a report fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> TsResult<Self> {
        if start > end {
            return Err(TsError::ValidationError {
                code: "INVALID_DATE_RANGE",
                message: format!(
                    "Start date {} cannot be later than end date {}",
                    ymd(&start),
                    ymd(&end)
                ),
            });
        }

        Ok(Self { start, end })
    }

    /// Whether a canonical `YYYYMMDD` date falls inside the window. Anything
    /// else (e.g. a date left in ROC form) is never inside.
    pub fn contains(&self, date: &str) -> bool {
        if date.len() != 8 || !is_ascii_digits(date) {
            return false;
        }

        match NaiveDate::parse_from_str(date, YMD_FORMAT) {
            Ok(date) => self.start <= date && date <= self.end,
            Err(_) => false,
        }
    }

    pub fn months(&self) -> Vec<String> {
        months_between(&self.start, &self.end)
    }

    pub fn start_str(&self) -> String {
        ymd(&self.start)
    }

    pub fn end_str(&self) -> String {
        ymd(&self.end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ~ {}", ymd(&self.start), ymd(&self.end))
    }
}

/// Fill missing endpoints with today and reject reversed windows.
pub fn check_date_range(start: Option<&str>, end: Option<&str>) -> TsResult<DateRange> {
    let today = Local::now().date_naive();

    let parse = |s: Option<&str>| -> TsResult<NaiveDate> {
        match s {
            Some(s) => date_from_str(s).map_err(|_| TsError::ValidationError {
                code: "INVALID_DATE",
                message: format!("Unable to parse date '{s}', expected YYYYMMDD"),
            }),
            None => Ok(today),
        }
    };

    DateRange::new(parse(start)?, parse(end)?)
}

pub fn date_from_str(s: &str) -> TsResult<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y%m%d",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y%m%dT%H%M%S",        // ISO 8601 Basic
        "%Y-%m-%dT%H:%M:%S%.f", // ISO 8601 Extended
    ];

    let s = s.trim();
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        // RFC 3339
        return Ok(datetime.date_naive());
    }

    Err(TsError::FormatError {
        code: "INVALID_DATE",
        message: format!("Unable to parse date '{s}'"),
    })
}

pub fn ymd(date: &NaiveDate) -> String {
    date.format(YMD_FORMAT).to_string()
}

pub fn today() -> String {
    ymd(&Local::now().date_naive())
}

/// `114/04/15` -> `20250415` (with `output_format` = `%Y%m%d`).
pub fn roc_to_ad(roc: &str, output_format: &str) -> TsResult<String> {
    let invalid = || TsError::FormatError {
        code: "INVALID_ROC_DATE",
        message: format!("Unable to convert ROC date '{roc}'"),
    };

    let parts: Vec<&str> = roc.trim().split('/').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let (Ok(year), Ok(month), Ok(day)) = (
        parts[0].trim().parse::<i32>(),
        parts[1].trim().parse::<u32>(),
        parts[2].trim().parse::<u32>(),
    ) else {
        return Err(invalid());
    };

    if year < 1 {
        return Err(TsError::FormatError {
            code: "INVALID_ROC_DATE",
            message: format!("ROC date '{roc}' is before the ROC era"),
        });
    }

    let year = year.checked_add(ROC_YEAR_OFFSET).ok_or_else(invalid)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

    format_date(&date, output_format)
}

/// `20250415` (parsed with `fmt`) -> `114/04/15`.
pub fn ad_to_roc(ad: &str, fmt: &str) -> TsResult<String> {
    let date = NaiveDate::parse_from_str(ad.trim(), fmt).map_err(|err| TsError::FormatError {
        code: "INVALID_AD_DATE",
        message: format!("Unable to convert date '{ad}': {err}"),
    })?;

    let roc_year = date.year() - ROC_YEAR_OFFSET;
    if roc_year < 1 {
        return Err(TsError::FormatError {
            code: "INVALID_AD_DATE",
            message: format!("Date '{ad}' is before the ROC era"),
        });
    }

    Ok(format!(
        "{:03}/{:02}/{:02}",
        roc_year,
        date.month(),
        date.day()
    ))
}

/// First-of-month markers (`YYYYMM01`) of every month touching `[start, end]`,
/// ascending and without duplicates.
pub fn month_range(start: &str, end: &str) -> TsResult<Vec<String>> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), YMD_FORMAT).map_err(|err| TsError::FormatError {
            code: "INVALID_DATE",
            message: format!("Unable to build month range {start} ~ {end}: {err}"),
        })
    };

    Ok(months_between(&parse(start)?, &parse(end)?))
}

fn months_between(start: &NaiveDate, end: &NaiveDate) -> Vec<String> {
    let mut months: Vec<String> = vec![];

    let (Some(mut cursor), Some(last)) = (start.with_day(1), end.with_day(1)) else {
        return months;
    };

    while cursor <= last {
        months.push(ymd(&cursor));

        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    months
}

fn format_date(date: &NaiveDate, fmt: &str) -> TsResult<String> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(TsError::FormatError {
            code: "INVALID_DATE_FORMAT",
            message: format!("Invalid date format '{fmt}'"),
        });
    }

    Ok(date.format_with_items(StrftimeItems::new(fmt)).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_to_ad() {
        assert_eq!(roc_to_ad("114/04/15", YMD_FORMAT).unwrap(), "20250415");
        assert_eq!(roc_to_ad("114/04/15", "%Y-%m-%d").unwrap(), "2025-04-15");
        assert_eq!(roc_to_ad("89/12/31", YMD_FORMAT).unwrap(), "20001231");

        assert!(roc_to_ad("114/04/31", YMD_FORMAT).is_err());
        assert!(roc_to_ad("114/04", YMD_FORMAT).is_err());
        assert!(roc_to_ad("114/04/15/01", YMD_FORMAT).is_err());
        assert!(roc_to_ad("114/Apr/15", YMD_FORMAT).is_err());
        assert!(roc_to_ad("", YMD_FORMAT).is_err());
        assert!(roc_to_ad("114/04/15", "%Q").is_err());
    }

    #[test]
    fn test_roc_to_ad_before_roc_era() {
        assert!(roc_to_ad("0/01/01", YMD_FORMAT).is_err());
        assert!(roc_to_ad("-5/01/01", YMD_FORMAT).is_err());
        assert!(ad_to_roc("19111231", YMD_FORMAT).is_err());

        let first = roc_to_ad("1/01/01", YMD_FORMAT).unwrap();
        assert_eq!(first, "19120101");
        assert_eq!(ad_to_roc(&first, YMD_FORMAT).unwrap(), "001/01/01");
    }

    #[test]
    fn test_ad_to_roc() {
        assert_eq!(ad_to_roc("20250415", YMD_FORMAT).unwrap(), "114/04/15");
        assert_eq!(ad_to_roc("2000-01-02", "%Y-%m-%d").unwrap(), "089/01/02");

        assert!(ad_to_roc("2025-04-15", YMD_FORMAT).is_err());
        assert!(ad_to_roc("19110101", YMD_FORMAT).is_err());
    }

    #[test]
    fn test_roc_ad_inverse() {
        for roc in [
            "001/01/01",
            "089/02/29",
            "100/12/31",
            "113/02/29",
            "114/01/15",
            "120/07/04",
        ] {
            let ad = roc_to_ad(roc, YMD_FORMAT).unwrap();
            assert_eq!(ad_to_roc(&ad, YMD_FORMAT).unwrap(), roc);
        }
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range("20250115", "20250310").unwrap(),
            vec!["20250101", "20250201", "20250301"]
        );
        assert_eq!(
            month_range("20241130", "20250102").unwrap(),
            vec!["20241101", "20241201", "20250101"]
        );
        assert_eq!(month_range("20250101", "20250131").unwrap(), vec!["20250101"]);
        assert_eq!(month_range("20250105", "20250105").unwrap(), vec!["20250101"]);
        assert!(month_range("20250301", "20250101").unwrap().is_empty());

        assert!(month_range("2025-01-01", "20250301").is_err());
        assert!(month_range("20250101", "tomorrow").is_err());
    }

    #[test]
    fn test_check_date_range() {
        let range = check_date_range(Some("20250101"), Some("20250131")).unwrap();
        assert_eq!(range.start_str(), "20250101");
        assert_eq!(range.end_str(), "20250131");
        assert_eq!(range.to_string(), "20250101 ~ 20250131");

        let range = check_date_range(None, None).unwrap();
        assert_eq!(range.start, range.end);
        assert_eq!(range.start_str(), today());

        let err = check_date_range(Some("20250201"), Some("20250101")).unwrap_err();
        assert!(matches!(err, TsError::ValidationError { .. }));

        let err = check_date_range(Some("2025/13/01"), None).unwrap_err();
        assert!(matches!(err, TsError::ValidationError { .. }));
    }

    #[test]
    fn test_date_range_contains() {
        let range = check_date_range(Some("20250110"), Some("20250120")).unwrap();

        assert!(range.contains("20250110"));
        assert!(range.contains("20250115"));
        assert!(range.contains("20250120"));
        assert!(!range.contains("20250109"));
        assert!(!range.contains("20250121"));
        assert!(!range.contains("114/01/15"));
        assert!(!range.contains("2025-01-15"));
    }

    #[test]
    fn test_date_from_str() {
        assert_eq!(
            ymd(&date_from_str("20231231").unwrap()),
            "20231231"
        );
        assert_eq!(
            ymd(&date_from_str("2023-12-31").unwrap()),
            "20231231"
        );
        assert_eq!(
            ymd(&date_from_str("2023/12/31").unwrap()),
            "20231231"
        );
        assert_eq!(
            ymd(&date_from_str("2023-12-31T23:59:59+08:00").unwrap()),
            "20231231"
        );
        assert!(date_from_str("invalid-date").is_err());
    }
}
