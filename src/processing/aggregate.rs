//! Grouping and reduction of filtered records.
//!
//! Every chart shape goes through [`aggregate`]: records are keyed by one or
//! more [`KeySpec`]s and each group is reduced according to a [`Reduction`].
//! Groups come out in first-encounter order; ordering is the sort stage's job.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};
use crate::data::record::Record;
use crate::data::schema::FieldId;
use crate::processing::binning::{self, ExtentBins};
use crate::processing::statistics::{self, FiveNumberSummary};

/// How one grouping dimension derives its key from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySpec {
    /// Categorical field value as-is.
    Category(FieldId),
    /// Exact numeric value.
    Value(FieldId),
    /// Numeric value floored to a fixed-width bucket.
    Bucket { field: FieldId, width: f64 },
    /// Numeric value placed in one of `bins` equal-width bins over the observed extent.
    Extent { field: FieldId, bins: usize },
}

impl KeySpec {
    pub fn field(&self) -> FieldId {
        match self {
            KeySpec::Category(f) | KeySpec::Value(f) => *f,
            KeySpec::Bucket { field, .. } | KeySpec::Extent { field, .. } => *field,
        }
    }

    fn part(&self, record: &Record, extent: Option<&ExtentBins>) -> Option<KeyPart> {
        match self {
            KeySpec::Category(f) => record.text(*f).map(|t| KeyPart::Category { value: t.to_string() }),
            KeySpec::Value(f) => record.number(*f).map(|v| KeyPart::Value { value: binning::canonical(v) }),
            KeySpec::Bucket { field, width } => record.number(*field).map(|v| KeyPart::Bucket {
                origin: binning::bucket(v, *width),
                width: *width,
            }),
            KeySpec::Extent { field, .. } => {
                let v = record.number(*field)?;
                let (low, high) = extent?.bounds(extent?.index_of(v));
                Some(KeyPart::Range { low, high })
            }
        }
    }
}

/// One component of a grouping key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyPart {
    Category { value: String },
    Value { value: f64 },
    Bucket { origin: f64, width: f64 },
    Range { low: f64, high: f64 },
}

impl KeyPart {
    /// Numeric position used for ordering; `None` for categories.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            KeyPart::Category { .. } => None,
            KeyPart::Value { value } => Some(*value),
            KeyPart::Bucket { origin, .. } => Some(*origin),
            KeyPart::Range { low, .. } => Some(*low),
        }
    }

    pub fn label(&self) -> String {
        match self {
            KeyPart::Category { value } => value.clone(),
            KeyPart::Value { value } => value.to_string(),
            KeyPart::Bucket { origin, width } => binning::bucket_label(*origin, *width),
            KeyPart::Range { low, high } => binning::range_label(*low, *high),
        }
    }
}

// Float parts compare by bit pattern; constructors canonicalize -0.0.
impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyPart::Category { value: a }, KeyPart::Category { value: b }) => a == b,
            (KeyPart::Value { value: a }, KeyPart::Value { value: b }) => a.to_bits() == b.to_bits(),
            (KeyPart::Bucket { origin: a, width: wa }, KeyPart::Bucket { origin: b, width: wb }) => {
                a.to_bits() == b.to_bits() && wa.to_bits() == wb.to_bits()
            }
            (KeyPart::Range { low: a, high: ha }, KeyPart::Range { low: b, high: hb }) => {
                a.to_bits() == b.to_bits() && ha.to_bits() == hb.to_bits()
            }
            _ => false,
        }
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            KeyPart::Category { value } => value.hash(state),
            KeyPart::Value { value } => value.to_bits().hash(state),
            KeyPart::Bucket { origin, width } => {
                origin.to_bits().hash(state);
                width.to_bits().hash(state);
            }
            KeyPart::Range { low, high } => {
                low.to_bits().hash(state);
                high.to_bits().hash(state);
            }
        }
    }
}

/// Full grouping key: one part per grouping dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn label(&self) -> String {
        self.0.iter().map(KeyPart::label).collect::<Vec<_>>().join(" / ")
    }
}

/// How each group is summarized.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    Count,
    Mean(FieldId),
    CountMean(FieldId),
    Sum(Vec<FieldId>),
    FiveNumber(FieldId),
}

impl Reduction {
    /// Numeric fields a record must carry to take part in this reduction.
    pub fn value_fields(&self) -> &[FieldId] {
        match self {
            Reduction::Count => &[],
            Reduction::Mean(f) | Reduction::CountMean(f) | Reduction::FiveNumber(f) => std::slice::from_ref(f),
            Reduction::Sum(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTotal {
    pub field: FieldId,
    pub total: f64,
}

/// Reduced value of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Summary {
    Count { count: usize },
    Mean { mean: f64 },
    CountMean { count: usize, mean: f64 },
    Sums { totals: Vec<FieldTotal> },
    FiveNumber(FiveNumberSummary),
}

impl Summary {
    /// The single number used when ordering by summary value.
    pub fn sort_value(&self) -> f64 {
        match self {
            Summary::Count { count } | Summary::CountMean { count, .. } => *count as f64,
            Summary::Mean { mean } => *mean,
            Summary::Sums { totals } => totals.iter().map(|t| t.total).sum(),
            Summary::FiveNumber(s) => s.median,
        }
    }
}

/// The reduction of all records sharing one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateGroup {
    pub key: GroupKey,
    pub label: String,
    /// Positions of the member records within the aggregated sequence.
    pub rows: Vec<usize>,
    pub summary: Summary,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub groups: Vec<AggregateGroup>,
    /// Records excluded because a key or value field was missing or non-numeric.
    pub dropped: usize,
}

struct GroupBuilder {
    key: GroupKey,
    rows: Vec<usize>,
    values: Vec<f64>,
    sums: Vec<f64>,
}

impl GroupBuilder {
    fn finish(self, reduction: &Reduction) -> Option<AggregateGroup> {
        let count = self.rows.len();
        let summary = match reduction {
            Reduction::Count => Summary::Count { count },
            Reduction::Mean(_) => Summary::Mean { mean: statistics::mean(&self.values)? },
            Reduction::CountMean(_) => Summary::CountMean {
                count,
                mean: statistics::mean(&self.values)?,
            },
            Reduction::Sum(fields) => Summary::Sums {
                totals: fields
                    .iter()
                    .zip(self.sums)
                    .map(|(field, total)| FieldTotal { field: *field, total })
                    .collect(),
            },
            Reduction::FiveNumber(_) => Summary::FiveNumber(FiveNumberSummary::compute(&self.values)?),
        };
        Some(AggregateGroup {
            label: self.key.label(),
            key: self.key,
            rows: self.rows,
            summary,
        })
    }
}

/// Group `records` by `keys` and reduce each group.
///
/// Records lacking a usable key or value are dropped and counted. An empty
/// input yields no groups.
pub fn aggregate(records: &[&Record], keys: &[KeySpec], reduction: &Reduction) -> Aggregation {
    let value_fields = reduction.value_fields();

    let valid: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            keys.iter().all(|k| match k {
                KeySpec::Category(f) => r.text(*f).is_some(),
                other => r.number(other.field()).is_some(),
            }) && value_fields.iter().all(|f| r.number(*f).is_some())
        })
        .map(|(i, _)| i)
        .collect();
    let dropped = records.len() - valid.len();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} of {} records with missing or invalid values", records.len());
    }

    let extents: Vec<Option<ExtentBins>> = keys
        .iter()
        .map(|k| match k {
            KeySpec::Extent { field, bins } => {
                ExtentBins::from_values(valid.iter().filter_map(|&i| records[i].number(*field)), *bins)
            }
            _ => None,
        })
        .collect();

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut builders: Vec<GroupBuilder> = Vec::new();

    for &i in &valid {
        let record = records[i];
        let parts: Option<Vec<KeyPart>> = keys
            .iter()
            .zip(&extents)
            .map(|(k, extent)| k.part(record, extent.as_ref()))
            .collect();
        let Some(parts) = parts else { continue };
        let key = GroupKey(parts);

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            builders.push(GroupBuilder {
                key,
                rows: Vec::new(),
                values: Vec::new(),
                sums: vec![0.0; value_fields.len()],
            });
            builders.len() - 1
        });
        let builder = &mut builders[slot];
        builder.rows.push(i);
        match reduction {
            Reduction::Count => {}
            Reduction::Sum(fields) => {
                for (acc, f) in builder.sums.iter_mut().zip(fields) {
                    *acc += record.number(*f).unwrap_or(0.0);
                }
            }
            Reduction::Mean(f) | Reduction::CountMean(f) | Reduction::FiveNumber(f) => {
                if let Some(v) = record.number(*f) {
                    builder.values.push(v);
                }
            }
        }
    }

    let groups = builders.into_iter().filter_map(|b| b.finish(reduction)).collect();
    Aggregation { groups, dropped }
}
