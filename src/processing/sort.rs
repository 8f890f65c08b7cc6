use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::processing::aggregate::{AggregateGroup, GroupKey, KeyPart};

/// What groups are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// The grouping key (x axis).
    #[default]
    GroupKey,
    /// The reduced value (y axis).
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    #[serde(default)]
    pub key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

fn compare_parts(a: &KeyPart, b: &KeyPart) -> Ordering {
    match (a.numeric(), b.numeric()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        // numbers sort before categories
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => match (a, b) {
            (KeyPart::Category { value: x }, KeyPart::Category { value: y }) => x.as_str().cmp(y.as_str()),
            _ => Ordering::Equal,
        },
    }
}

/// Compare keys part by part: numerically for numeric parts, ordinally for categories.
pub fn compare_keys(a: &GroupKey, b: &GroupKey) -> Ordering {
    a.parts()
        .iter()
        .zip(b.parts())
        .map(|(x, y)| compare_parts(x, y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.parts().len().cmp(&b.parts().len()))
}

/// Stable sort of groups; equal elements keep their encounter order in both directions.
pub fn sort_groups(groups: &mut [AggregateGroup], order: SortOrder) {
    let cmp = |a: &AggregateGroup, b: &AggregateGroup| match order.key {
        SortKey::GroupKey => compare_keys(&a.key, &b.key),
        SortKey::Value => a.summary.sort_value().total_cmp(&b.summary.sort_value()),
    };
    match order.direction {
        SortDirection::Ascending => groups.sort_by(cmp),
        SortDirection::Descending => groups.sort_by(|a, b| cmp(b, a)),
    }
}
