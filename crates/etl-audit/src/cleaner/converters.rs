//! Type conversion functions for data cleaning.

use crate::utils::{parse_numeric_string, series_to_text};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date formats tried in order when no formats are configured.
///
/// Month-first is tried before day-first for slash-separated dates.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y",
];

/// Parse one value with the first matching format.
///
/// Date-only formats yield midnight.
pub fn parse_date_value(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    formats.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(trimmed, fmt).ok().or_else(|| {
            NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
    })
}

/// Convert a series to millisecond datetimes.
///
/// Returns the converted series and the count of present values that failed
/// to parse (those become null).
pub(crate) fn text_to_datetime(series: &Series, formats: &[&str]) -> PolarsResult<(Series, usize)> {
    let mut unparseable = 0;
    let timestamps: Vec<Option<i64>> = series_to_text(series)?
        .into_iter()
        .map(|value| {
            let value = value?;
            let parsed = parse_date_value(&value, formats);
            if parsed.is_none() {
                unparseable += 1;
            }
            parsed.map(|dt| dt.and_utc().timestamp_millis())
        })
        .collect();

    let converted = Series::new(series.name().clone(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok((converted, unparseable))
}

/// Convert a text series to Float64.
///
/// Returns the converted series and the count of present values that were not
/// numeric (those become null).
pub(crate) fn text_to_float(series: &Series, decimal_separator: char) -> PolarsResult<(Series, usize)> {
    let mut unparseable = 0;
    let values: Vec<Option<f64>> = series
        .str()?
        .into_iter()
        .map(|value| {
            let value = value?;
            let parsed = parse_numeric_string(value, decimal_separator);
            if parsed.is_none() {
                unparseable += 1;
            }
            parsed
        })
        .collect();

    Ok((Series::new(series.name().clone(), values), unparseable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_date_value_default_formats() {
        assert_eq!(
            parse_date_value("2023-01-15", DEFAULT_DATE_FORMATS),
            Some(datetime(2023, 1, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_date_value("15.01.2023", DEFAULT_DATE_FORMATS),
            Some(datetime(2023, 1, 15, 0, 0, 0))
        );
        assert_eq!(
            parse_date_value("2023-01-15 08:30:00", DEFAULT_DATE_FORMATS),
            Some(datetime(2023, 1, 15, 8, 30, 0))
        );
        assert_eq!(
            parse_date_value(" 25/12/2022 ", DEFAULT_DATE_FORMATS),
            Some(datetime(2022, 12, 25, 0, 0, 0))
        );
    }

    #[test]
    fn test_slash_dates_prefer_month_first() {
        assert_eq!(
            parse_date_value("03/04/2021", DEFAULT_DATE_FORMATS),
            Some(datetime(2021, 3, 4, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_date_value_rejects_garbage() {
        assert_eq!(parse_date_value("", DEFAULT_DATE_FORMATS), None);
        assert_eq!(parse_date_value("yesterday", DEFAULT_DATE_FORMATS), None);
        assert_eq!(parse_date_value("2023-13-45", DEFAULT_DATE_FORMATS), None);
    }

    #[test]
    fn test_text_to_datetime_counts_failures() {
        let series = Series::new("d".into(), &[Some("2023-01-01"), Some("bad"), None]);

        let (converted, unparseable) = text_to_datetime(&series, DEFAULT_DATE_FORMATS).unwrap();

        assert_eq!(unparseable, 1);
        assert_eq!(converted.null_count(), 2);
        assert_eq!(
            converted.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }

    #[test]
    fn test_text_to_float() {
        let series = Series::new("v".into(), &[Some("1,5"), Some("abc"), None, Some("-2")]);

        let (converted, unparseable) = text_to_float(&series, ',').unwrap();

        assert_eq!(unparseable, 1);
        let values: Vec<Option<f64>> = converted.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.5), None, None, Some(-2.0)]);
    }
}
