use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::data::schema::{FieldId, FieldKind, Schema};

/// A single cell of a survey record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Coerce a raw CSV cell into a value of the given kind.
    /// Numeric cells that do not parse to a finite number become `Missing`.
    pub fn coerce(raw: &str, kind: FieldKind) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match kind {
            FieldKind::Numeric => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Value::Number(v),
                _ => Value::Missing,
            },
            FieldKind::Categorical => Value::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

static MISSING: Value = Value::Missing;

/// One survey respondent. Values are stored in the order of the schema's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    schema: Schema,
    values: Vec<Value>,
}

impl Record {
    /// Build a record from values in schema order. Missing trailing values are padded.
    pub fn new(schema: Schema, mut values: Vec<Value>) -> Self {
        values.resize(schema.fields().len(), Value::Missing);
        Self { schema, values }
    }

    /// Build a record from (field, value) pairs; fields outside the schema are ignored.
    pub fn from_pairs<I>(schema: Schema, pairs: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, Value)>,
    {
        let mut values = vec![Value::Missing; schema.fields().len()];
        for (field, value) in pairs {
            if let Some(pos) = schema.position(field) {
                values[pos] = value;
            }
        }
        Self { schema, values }
    }

    pub fn get(&self, field: FieldId) -> &Value {
        self.schema
            .position(field)
            .and_then(|pos| self.values.get(pos))
            .unwrap_or(&MISSING)
    }

    pub fn number(&self, field: FieldId) -> Option<f64> {
        self.get(field).as_f64()
    }

    pub fn text(&self, field: FieldId) -> Option<&str> {
        self.get(field).as_text()
    }
}

/// The loaded record store. Immutable once built; a reload replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub schema: Schema,
    records: Arc<[Record]>,
}

impl Dataset {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self {
            schema,
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
