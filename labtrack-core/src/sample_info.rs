use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};
use valuable::Valuable;

mod field;
mod record;

pub use field::{
    FieldDescription, FieldError, FieldErrorMap, FieldKind, FieldSpec, FieldValue, MAX_TEXT_LENGTH,
};
pub use record::ValidatedRecord;

/// A decoded sample-info document before any coercion.
pub type RawPayload = Map<String, Value>;

const BATTERY: &[FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::text("composition").allow_blank(),
    FieldSpec::text("manufacturer").required(),
    FieldSpec::date("produced"),
    FieldSpec::text("comment"),
];

const SOLIDS: &[FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::decimal("weight_in_g").required(),
    FieldSpec::decimal("volume_in_ccm"),
    FieldSpec::decimal("density_in_gccm"),
    FieldSpec::text("comment"),
];

const LIQUID: &[FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::decimal("volume_in_ccm").required(),
    FieldSpec::decimal("weight_in_g"),
    FieldSpec::decimal("density_in_gccm"),
    FieldSpec::text("comment"),
];

const SUSPENSION: &[FieldSpec] = &[
    FieldSpec::text("name").required(),
    FieldSpec::text("liquid").required(),
    FieldSpec::text("solid").required(),
    FieldSpec::decimal("volume_in_ccm").required(),
    FieldSpec::decimal("weight_in_g"),
    FieldSpec::decimal("density_in_gccm"),
];

/// The metadata schemas a sample can be described by, one per sample type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Valuable,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
    strum::VariantArray,
)]
pub enum SampleInfoSchema {
    Battery,
    Solids,
    Liquid,
    Suspension,
}

impl SampleInfoSchema {
    /// Looks up a schema by sample-type name, ignoring case (`battery`,
    /// `BATTERY`, and `Battery` are all the same schema).
    #[must_use]
    pub fn resolve(sample_type_name: &str) -> Option<Self> {
        capitalize(sample_type_name).parse().ok()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Battery => BATTERY,
            Self::Solids => SOLIDS,
            Self::Liquid => LIQUID,
            Self::Suspension => SUSPENSION,
        }
    }

    /// Validates every declared field of `payload`, reporting all failures
    /// together. Keys the schema does not declare are ignored.
    ///
    /// # Errors
    /// A [`FieldErrorMap`] with an entry for each field that failed
    pub fn validate(self, payload: &RawPayload) -> Result<ValidatedRecord, FieldErrorMap> {
        let mut values = Vec::with_capacity(self.fields().len());
        let mut errors = FieldErrorMap::default();

        for field in self.fields() {
            match field.validate(payload.get(field.name)) {
                Ok(value) => values.push((field.name, value)),
                Err(err) => errors.insert(field.name, err),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedRecord::new(self, values))
    }

    #[must_use]
    pub fn describe(self) -> SchemaDescription {
        SchemaDescription(
            self.fields()
                .iter()
                .map(|field| (field.name, field.describe()))
                .collect(),
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    first
        .to_uppercase()
        .chain(chars.flat_map(char::to_lowercase))
        .collect()
}

/// What a client needs to build a form for a schema, keyed by field name in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescription(Vec<(&'static str, FieldDescription)>);

impl SchemaDescription {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldDescription> {
        self.0
            .iter()
            .find_map(|(name, description)| (*name == field).then_some(description))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }
}

impl Serialize for SchemaDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, description) in &self.0 {
            map.serialize_entry(name, description)?;
        }

        map.end()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Valuable)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SampleInfoError {
    #[error("sample information must be a UTF-8 encoded JSON object: {message}")]
    MalformedDocument { message: String },
    #[error("no sample information schema for sample type {name}")]
    UnknownSampleType { name: String },
    #[error("invalid sample information: {fields}")]
    InvalidFields { fields: FieldErrorMap },
}

impl From<FieldErrorMap> for SampleInfoError {
    fn from(fields: FieldErrorMap) -> Self {
        Self::InvalidFields { fields }
    }
}

#[must_use]
pub fn resolve(sample_type_name: &str) -> Option<SampleInfoSchema> {
    SampleInfoSchema::resolve(sample_type_name)
}

/// Returns a new payload in which every empty string has become `null`, so
/// that blank optional fields read as "not provided".
#[must_use]
pub fn normalize(raw_payload: &RawPayload) -> RawPayload {
    raw_payload
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) if s.is_empty() => Value::Null,
                other => other.clone(),
            };

            (key.clone(), value)
        })
        .collect()
}

/// # Errors
/// See [`SampleInfoSchema::validate`]
pub fn validate(
    payload: &RawPayload,
    schema: SampleInfoSchema,
) -> Result<ValidatedRecord, FieldErrorMap> {
    schema.validate(payload)
}

/// Decodes `raw_payload_bytes` as a flat JSON object and validates it against
/// the schema for `sample_type_name`.
///
/// # Errors
/// - [`SampleInfoError::MalformedDocument`] if the bytes are not UTF-8 or not a
///   JSON object
/// - [`SampleInfoError::UnknownSampleType`] if no schema matches the name
/// - [`SampleInfoError::InvalidFields`] if the payload does not fit the schema
pub fn validate_sample_info(
    sample_type_name: &str,
    raw_payload_bytes: &[u8],
) -> Result<ValidatedRecord, SampleInfoError> {
    let malformed = |message: String| SampleInfoError::MalformedDocument { message };

    let text = std::str::from_utf8(raw_payload_bytes).map_err(|e| malformed(e.to_string()))?;
    let payload: RawPayload = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let schema =
        resolve(sample_type_name).ok_or_else(|| SampleInfoError::UnknownSampleType {
            name: sample_type_name.to_string(),
        })?;

    let payload = normalize(&payload);

    Ok(schema.validate(&payload)?)
}
