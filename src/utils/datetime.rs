//! 表单与日历提交的日期时间解析
//!
//! 带时区的值换算为 UTC；不带时区的值按 UTC 理解（服务器时区固定为 UTC）。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::errors::{HesoError, Result};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let value = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(HesoError::date_parse(format!(
        "Enter a valid date/time: '{value}'"
    )))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| HesoError::date_parse(format!("Enter a valid date: '{}'", input.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_datetime("2024-03-04T10:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse_datetime("2024-03-04T10:30").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap());
        let dt = parse_datetime("2024-03-04 10:30:15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 15).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse_datetime("next tuesday").unwrap_err();
        assert_eq!(err.code(), "E010");
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(
            parse_date(" 2024-03-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
