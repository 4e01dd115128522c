use std::{collections::BTreeMap, fmt::Display};

use chrono::NaiveDate;
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;
use valuable::Valuable;

pub const MAX_TEXT_LENGTH: usize = 255;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Valuable)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Decimal,
    Date,
}

impl FieldKind {
    /// The HTML input a form should render for this kind of field.
    #[must_use]
    pub fn input_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Decimal => "number",
            Self::Date => "date",
        }
    }

    fn max_length(self) -> Option<usize> {
        match self {
            Self::Text => Some(MAX_TEXT_LENGTH),
            Self::Decimal | Self::Date => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub allow_blank: bool,
    pub min_value: Option<f64>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            allow_blank: false,
            min_value: None,
        }
    }

    pub(super) const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Decimals are never negative.
    pub(super) const fn decimal(name: &'static str) -> Self {
        Self {
            min_value: Some(0.0),
            ..Self::new(name, FieldKind::Decimal)
        }
    }

    pub(super) const fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub(super) const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub(super) const fn allow_blank(self) -> Self {
        Self {
            allow_blank: true,
            ..self
        }
    }

    /// Coerces a single JSON value to the declared type of this field. `None`
    /// and `null` are the same thing here. Text is trimmed before the blank
    /// check and stored trimmed.
    ///
    /// # Errors
    /// The reason `value` is not acceptable for this field
    pub fn validate(&self, value: Option<&Value>) -> Result<FieldValue, FieldError> {
        let value = match value {
            None | Some(Value::Null) if self.required => {
                return Err(FieldError::RequiredFieldMissing);
            }
            None | Some(Value::Null) => return Ok(FieldValue::Null),
            Some(value) => value,
        };

        match self.kind {
            FieldKind::Text => self.validate_text(value),
            FieldKind::Decimal => self.validate_decimal(value),
            FieldKind::Date => validate_date(value),
        }
    }

    fn validate_text(&self, value: &Value) -> Result<FieldValue, FieldError> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(FieldError::TypeError {
                    expected: "a string",
                });
            }
        };

        if text.is_empty() && !self.allow_blank {
            return Err(FieldError::Blank);
        }

        if text.chars().count() > MAX_TEXT_LENGTH {
            return Err(FieldError::TooLong {
                max: MAX_TEXT_LENGTH,
            });
        }

        Ok(FieldValue::Text(text))
    }

    fn validate_decimal(&self, value: &Value) -> Result<FieldValue, FieldError> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|n: &f64| n.is_finite())
        .ok_or(FieldError::TypeError {
            expected: "a number",
        })?;

        if let Some(min) = self.min_value {
            if number < min {
                return Err(FieldError::RangeError { min });
            }
        }

        Ok(FieldValue::Decimal(number))
    }

    #[must_use]
    pub fn describe(&self) -> FieldDescription {
        let Self {
            kind,
            required,
            allow_blank,
            min_value,
            ..
        } = *self;

        FieldDescription {
            kind,
            required,
            allow_null: !required,
            allow_blank,
            min_value,
            max_length: kind.max_length(),
            input_type: kind.input_type(),
        }
    }
}

fn validate_date(value: &Value) -> Result<FieldValue, FieldError> {
    let type_error = FieldError::TypeError {
        expected: "a date in YYYY-MM-DD format",
    };

    let Value::String(s) = value else {
        return Err(type_error);
    };

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(FieldValue::Date)
        .map_err(|_| type_error)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescription {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    pub allow_null: bool,
    pub allow_blank: bool,
    pub min_value: Option<f64>,
    pub max_length: Option<usize>,
    pub input_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Decimal(f64),
    Date(NaiveDate),
    Null,
}

impl FieldValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Decimal(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            // Only finite numbers get past validation
            Self::Decimal(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            Self::Null => Value::Null,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Valuable)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldError {
    #[error("this field is required")]
    RequiredFieldMissing,
    #[error("expected {expected}")]
    TypeError { expected: &'static str },
    #[error("ensure this value is greater than or equal to {min}")]
    RangeError { min: f64 },
    #[error("this field may not be blank")]
    Blank,
    #[error("ensure this field has no more than {max} characters")]
    TooLong { max: usize },
}

/// Every field that failed validation, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Valuable)]
pub struct FieldErrorMap(BTreeMap<String, Vec<FieldError>>);

impl FieldErrorMap {
    pub fn insert(&mut self, field: &str, error: FieldError) {
        self.0.entry(field.to_string()).or_default().push(error);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl Serialize for FieldErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, errors) in self.iter() {
            let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
            map.serialize_entry(field, &messages)?;
        }

        map.end()
    }
}

impl Display for FieldErrorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, errors) in self.iter() {
            for err in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {err}")?;
                first = false;
            }
        }

        Ok(())
    }
}
