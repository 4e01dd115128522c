use std::{collections::HashMap, fmt::Display, str::FromStr};

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::NaiveDate;

use super::error::{Error, Result};
use crate::db::model::sample::SampleSubmission;

/// The parts of a `multipart/form-data` sample submission, keyed by field
/// name. Later parts with the same name replace earlier ones.
#[derive(Debug, Default)]
pub(super) struct SampleForm(HashMap<String, Bytes>);

fn invalid(reason: String) -> Error {
    Error::SimpleData { reason }
}

impl SampleForm {
    pub(super) async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut parts = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let contents = field.bytes().await?;

            parts.insert(name, contents);
        }

        Ok(Self(parts))
    }

    /// Empty text fields count as missing.
    fn text(&self, name: &str) -> Result<Option<String>> {
        let Some(bytes) = self.0.get(name) else {
            return Ok(None);
        };

        let text = std::str::from_utf8(bytes)
            .map_err(|_| invalid(format!("field `{name}` is not valid UTF-8")))?
            .trim();

        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    fn required_text(&self, name: &str) -> Result<String> {
        self.text(name)?
            .ok_or_else(|| invalid(format!("missing field `{name}`")))
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(name)?
            .map(|text| {
                text.parse()
                    .map_err(|e| invalid(format!("field `{name}`: {e}")))
            })
            .transpose()
    }

    fn required<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parse(name)?
            .ok_or_else(|| invalid(format!("missing field `{name}`")))
    }

    pub(super) fn into_submission(mut self, today: NaiveDate) -> Result<SampleSubmission> {
        let sample_info = self
            .0
            .remove("sample_info")
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| invalid("missing file `sample_info`".to_string()))?;

        Ok(SampleSubmission {
            sample_id: self.required_text("sample_id")?,
            institute_id: self.required("institute_id")?,
            method_id: self.parse("method_id")?,
            project_id: self.required("project_id")?,
            sample_type_id: self.required("sample_type_id")?,
            parent_id: self.text("parent_id")?,
            name: self.required_text("name")?,
            date_created: self.required("date_created")?,
            sample_info,
            today,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn form(parts: &[(&str, &str)]) -> SampleForm {
        SampleForm(
            parts
                .iter()
                .map(|(name, value)| ((*name).to_string(), Bytes::from(value.to_string())))
                .collect(),
        )
    }

    const COMPLETE: &[(&str, &str)] = &[
        ("sample_id", "240101_120000_010001"),
        ("institute_id", "1"),
        ("method_id", ""),
        ("project_id", "3"),
        ("sample_type_id", "2"),
        ("name", "brick"),
        ("date_created", "2024-01-01"),
        ("sample_info", r#"{"name": "brick", "weight_in_g": 5}"#),
    ];

    #[test]
    fn complete_form() {
        let submission = form(COMPLETE).into_submission(today()).unwrap();

        assert_eq!(submission.sample_id, "240101_120000_010001");
        assert_eq!(submission.institute_id, 1);
        assert_eq!(submission.method_id, None);
        assert_eq!(submission.project_id, 3);
        assert_eq!(submission.sample_type_id, 2);
        assert_eq!(submission.parent_id, None);
        assert_eq!(
            submission.date_created,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(submission.today, today());
        assert_eq!(
            submission.sample_info,
            Bytes::from_static(br#"{"name": "brick", "weight_in_g": 5}"#)
        );
    }

    #[test]
    fn optional_references() {
        let mut parts = COMPLETE.to_vec();
        parts.extend([("method_id", "7"), ("parent_id", "231231_235959_010001")]);

        let submission = form(&parts).into_submission(today()).unwrap();

        assert_eq!(submission.method_id, Some(7));
        assert_eq!(submission.parent_id.as_deref(), Some("231231_235959_010001"));
    }

    #[rstest]
    #[case::missing_sample_id("sample_id", None, "missing field `sample_id`")]
    #[case::blank_name("name", Some(" "), "missing field `name`")]
    #[case::non_numeric_institute("institute_id", Some("one"), "field `institute_id`: invalid digit")]
    #[case::bad_date("date_created", Some("01.01.2024"), "field `date_created`: ")]
    #[case::missing_sample_info("sample_info", None, "missing file `sample_info`")]
    #[case::empty_sample_info("sample_info", Some(""), "missing file `sample_info`")]
    fn invalid_form(#[case] field: &str, #[case] value: Option<&str>, #[case] expected: &str) {
        let parts: Vec<_> = COMPLETE
            .iter()
            .filter(|(name, _)| *name != field)
            .copied()
            .chain(value.map(|v| (field, v)))
            .collect();

        let err = form(&parts).into_submission(today()).unwrap_err();

        let Error::SimpleData { reason } = &err else {
            panic!("expected invalid data, got {err:?}");
        };
        assert!(reason.starts_with(expected), "{reason}");
    }
}
