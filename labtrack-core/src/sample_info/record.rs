use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

use super::{SampleInfoSchema, field::FieldValue};

/// The typed values of a sample-info document that passed validation, in the
/// order the schema declares its fields. Fields the schema does not know about
/// are not carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    schema: SampleInfoSchema,
    values: Vec<(&'static str, FieldValue)>,
}

impl ValidatedRecord {
    pub(super) fn new(schema: SampleInfoSchema, values: Vec<(&'static str, FieldValue)>) -> Self {
        Self { schema, values }
    }

    #[must_use]
    pub fn schema(&self) -> SampleInfoSchema {
        self.schema
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find_map(|(name, value)| (*name == field).then_some(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// A flat JSON object that validates back to this same record. Its keys
    /// are sorted; serialize the record itself to keep declaration order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();

        Value::Object(object)
    }
}

impl Serialize for ValidatedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }

        map.end()
    }
}
