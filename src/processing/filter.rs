use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::data::record::Record;
use crate::data::schema::{FieldId, FieldKind, Schema};
use crate::error::{Error, Result};

/// A required value for one field, as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    /// `"All"` is how the dashboard's filter menus say "no constraint".
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, FilterValue::Text(t) if t.trim().eq_ignore_ascii_case("all"))
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Number(v) => write!(f, "{v}"),
            FilterValue::Text(t) => f.write_str(t),
        }
    }
}

/// One resolved equality constraint.
#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Text(FieldId, String),
    Number(FieldId, f64),
}

impl Constraint {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Constraint::Text(field, want) => record.text(*field) == Some(want.as_str()),
            Constraint::Number(field, want) => record.number(*field) == Some(*want),
        }
    }
}

/// The active equality constraints. Fields without a constraint are not filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    constraints: Vec<Constraint>,
}

impl FilterSet {
    /// Resolve named constraints against `schema`, failing on unknown fields
    /// or values that can never match the field's kind.
    pub fn resolve(schema: Schema, filters: &BTreeMap<String, FilterValue>) -> Result<Self> {
        let mut constraints = Vec::with_capacity(filters.len());
        for (name, value) in filters {
            let field = schema.resolve(name)?;
            if value.is_unconstrained() {
                continue;
            }
            let constraint = match (field.kind(), value) {
                (FieldKind::Categorical, v) => Constraint::Text(field, v.to_string()),
                (FieldKind::Numeric, FilterValue::Number(n)) => Constraint::Number(field, *n),
                (FieldKind::Numeric, FilterValue::Text(t)) => match t.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => Constraint::Number(field, n),
                    _ => {
                        return Err(Error::InvalidFilterValue {
                            field: name.clone(),
                            value: t.clone(),
                        })
                    }
                },
            };
            constraints.push(constraint);
        }
        Ok(Self { constraints })
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }

    /// Records satisfying every constraint, in their original order.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        if self.is_empty() {
            return records.iter().collect();
        }
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
