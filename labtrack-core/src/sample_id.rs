use std::{fmt::Display, ops::Range, str::FromStr, sync::LazyLock};

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;
use valuable::Valuable;

/// `yymmdd_hhmmss_iimmmm`
static SAMPLE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}_[0-9]{6}_[0-9]{6}$").unwrap());

const DATE: Range<usize> = 0..6;
const TIME: Range<usize> = 7..13;
const INSTITUTE_CODE: Range<usize> = 14..16;
const METHOD_CODE: Range<usize> = 16..20;

// Two-digit years below this are in the 2000s, the rest in the 1900s
const CENTURY_PIVOT: u16 = 69;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Valuable)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SampleIdError {
    #[error("sample ID must be in the format 'yymmdd_hhmmss_iimmmm'")]
    Format,
    #[error("the date part of the sample ID is not valid")]
    Date,
    #[error("the date part of the sample ID must be in the past")]
    DateNotPast,
    #[error("the time part of the sample ID is not valid")]
    Time,
    #[error("the institute code {code} exceeds the highest institute id {max}")]
    InstituteCodeRange { code: i32, max: i32 },
    #[error("the method code {code} exceeds the highest method id {max}")]
    MethodCodeRange { code: i32, max: i32 },
    #[error("failed to look up the highest institute and method ids: {message}")]
    LookupUnavailable { message: String },
}

/// The highest institute and method ids currently assigned. Codes embedded in
/// a sample ID are checked against these as upper bounds, so a code that
/// belonged to a since-deleted record still passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Valuable)]
pub struct KnownCodes {
    pub institute: i32,
    pub method: i32,
}

impl KnownCodes {
    #[must_use]
    pub fn new(institute: i32, method: i32) -> Self {
        Self { institute, method }
    }
}

/// A sample ID whose shape has been checked. Whether its parts make sense is
/// decided by [`SampleId::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Valuable)]
#[serde(transparent)]
pub struct SampleId(String);

impl SampleId {
    /// # Errors
    /// [`SampleIdError::Format`] if `s` is not three groups of six digits
    /// separated by underscores
    pub fn parse(s: &str) -> Result<Self, SampleIdError> {
        if !SAMPLE_ID_PATTERN.is_match(s) {
            return Err(SampleIdError::Format);
        }

        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // The pattern guarantees ASCII digits at every position we read
    fn digits(&self, range: Range<usize>) -> u16 {
        self.0.as_bytes()[range]
            .iter()
            .fold(0, |acc, b| acc * 10 + u16::from(b - b'0'))
    }

    /// # Errors
    /// [`SampleIdError::Date`] if the first segment is not a calendar date
    pub fn date(&self) -> Result<NaiveDate, SampleIdError> {
        let (yy, mm, dd) = (
            self.digits(DATE.start..DATE.start + 2),
            self.digits(DATE.start + 2..DATE.start + 4),
            self.digits(DATE.start + 4..DATE.end),
        );

        let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };

        NaiveDate::from_ymd_opt(i32::from(year), u32::from(mm), u32::from(dd))
            .ok_or(SampleIdError::Date)
    }

    /// # Errors
    /// [`SampleIdError::Time`] if the second segment is not a time of day
    pub fn time(&self) -> Result<NaiveTime, SampleIdError> {
        let (hh, mm, ss) = (
            self.digits(TIME.start..TIME.start + 2),
            self.digits(TIME.start + 2..TIME.start + 4),
            self.digits(TIME.start + 4..TIME.end),
        );

        NaiveTime::from_hms_opt(u32::from(hh), u32::from(mm), u32::from(ss))
            .ok_or(SampleIdError::Time)
    }

    #[must_use]
    pub fn institute_code(&self) -> i32 {
        i32::from(self.digits(INSTITUTE_CODE))
    }

    #[must_use]
    pub fn method_code(&self) -> i32 {
        i32::from(self.digits(METHOD_CODE))
    }

    /// Checks, in order, the date (which must be strictly before `today`), the
    /// time, the institute code, and the method code.
    ///
    /// # Errors
    /// The first check that fails
    pub fn validate(&self, known_codes: &KnownCodes, today: NaiveDate) -> Result<(), SampleIdError> {
        if self.date()? >= today {
            return Err(SampleIdError::DateNotPast);
        }

        self.time()?;

        let code = self.institute_code();
        if code > known_codes.institute {
            return Err(SampleIdError::InstituteCodeRange {
                code,
                max: known_codes.institute,
            });
        }

        let code = self.method_code();
        if code > known_codes.method {
            return Err(SampleIdError::MethodCodeRange {
                code,
                max: known_codes.method,
            });
        }

        Ok(())
    }
}

/// Parses and fully validates `identifier`.
///
/// # Errors
/// See [`SampleId::parse`] and [`SampleId::validate`]
pub fn validate(
    identifier: &str,
    known_codes: &KnownCodes,
    today: NaiveDate,
) -> Result<SampleId, SampleIdError> {
    let sample_id = SampleId::parse(identifier)?;
    sample_id.validate(known_codes, today)?;

    Ok(sample_id)
}

impl FromStr for SampleId {
    type Err = SampleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for SampleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SampleId> for String {
    fn from(SampleId(inner): SampleId) -> Self {
        inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const ALL_CODES: KnownCodes = KnownCodes {
        institute: 99,
        method: 9999,
    };

    #[rstest]
    #[case("")]
    #[case("240101_235959_01999")]
    #[case("240101_235959_0199999")]
    #[case("240101-235959-019999")]
    #[case("2401010_23595_019999")]
    #[case("24010a_235959_019999")]
    #[case(" 240101_235959_019999")]
    #[case("240101_235959_019999\n")]
    #[case("٢٤٠١٠١_235959_019999")]
    fn malformed_sample_id(#[case] identifier: &str) {
        assert_eq!(
            validate(identifier, &ALL_CODES, date(2030, 1, 1)),
            Err(SampleIdError::Format)
        );
    }

    #[rstest]
    #[case("240601_120000_010001", Err(SampleIdError::DateNotPast))]
    #[case("240602_120000_010001", Err(SampleIdError::DateNotPast))]
    #[case("250101_120000_010001", Err(SampleIdError::DateNotPast))]
    #[case("240531_120000_010001", Ok(()))]
    fn sample_id_date_must_be_in_the_past(
        #[case] identifier: &str,
        #[case] expected: Result<(), SampleIdError>,
    ) {
        let result = validate(identifier, &ALL_CODES, date(2024, 6, 1)).map(|_| ());
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case("241301_120000_010001")]
    #[case("240001_120000_010001")]
    #[case("240230_120000_010001")]
    #[case("230229_120000_010001")]
    #[case("240100_120000_010001")]
    fn invalid_sample_id_date(#[case] identifier: &str) {
        assert_eq!(
            validate(identifier, &ALL_CODES, date(2030, 1, 1)),
            Err(SampleIdError::Date)
        );
    }

    #[rstest]
    #[case("240101_240000_010001")]
    #[case("240101_126000_010001")]
    #[case("240101_120060_010001")]
    #[case("240101_999999_010001")]
    fn invalid_sample_id_time(#[case] identifier: &str) {
        assert_eq!(
            validate(identifier, &ALL_CODES, date(2030, 1, 1)),
            Err(SampleIdError::Time)
        );
    }

    #[test]
    fn two_digit_years() {
        let recent = SampleId::parse("680101_000000_000000").unwrap();
        assert_eq!(recent.date(), Ok(date(2068, 1, 1)));

        let old = SampleId::parse("690101_000000_000000").unwrap();
        assert_eq!(old.date(), Ok(date(1969, 1, 1)));
    }

    #[test]
    fn sample_id_parts() {
        let sample_id = SampleId::parse("240229_075901_039876").unwrap();

        assert_eq!(sample_id.date(), Ok(date(2024, 2, 29)));
        assert_eq!(
            sample_id.time(),
            Ok(NaiveTime::from_hms_opt(7, 59, 1).unwrap())
        );
        assert_eq!(sample_id.institute_code(), 3);
        assert_eq!(sample_id.method_code(), 9876);
        assert_eq!(sample_id.to_string(), "240229_075901_039876");
    }

    #[test]
    fn codes_at_their_maxima() {
        let known_codes = KnownCodes::new(1, 9999);
        let sample_id = validate("240101_235959_019999", &known_codes, date(2024, 6, 1)).unwrap();

        assert_eq!(sample_id.as_str(), "240101_235959_019999");
    }

    #[test]
    fn method_code_out_of_range() {
        let known_codes = KnownCodes::new(1, 100);

        assert_eq!(
            validate("240101_235959_019999", &known_codes, date(2024, 6, 1)),
            Err(SampleIdError::MethodCodeRange {
                code: 9999,
                max: 100
            })
        );
    }

    #[test]
    fn institute_code_out_of_range() {
        let known_codes = KnownCodes::new(1, 9999);

        assert_eq!(
            validate("240101_235959_029999", &known_codes, date(2024, 6, 1)),
            Err(SampleIdError::InstituteCodeRange { code: 2, max: 1 })
        );
    }

    #[test]
    fn codes_are_upper_bounds() {
        // Nothing here knows which ids still exist, only the highest one
        let known_codes = KnownCodes::new(5, 5);

        assert!(validate("240101_120000_030003", &known_codes, date(2024, 6, 1)).is_ok());
        assert!(validate("240101_120000_000000", &known_codes, date(2024, 6, 1)).is_ok());
    }

    #[test]
    fn date_is_checked_before_codes() {
        let no_codes = KnownCodes::default();

        assert_eq!(
            validate("240101_120000_999999", &no_codes, date(2024, 1, 1)),
            Err(SampleIdError::DateNotPast)
        );
        assert_eq!(
            validate("240101_250000_999999", &no_codes, date(2024, 6, 1)),
            Err(SampleIdError::Time)
        );
    }

    #[test]
    fn serialized_error() {
        let err = SampleIdError::InstituteCodeRange { code: 4, max: 2 };

        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"type": "institute_code_range", "code": 4, "max": 2})
        );
    }
}
