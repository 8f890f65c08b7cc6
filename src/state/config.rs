use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::data::schema::FieldId;
use crate::processing::filter::FilterValue;
use crate::processing::sort::SortOrder;

/// Reduction applied to each group, as chosen in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMode {
    #[default]
    Count,
    Mean,
    CountMean,
    Sum,
    Summary5,
}

impl ReductionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReductionMode::Count => "count",
            ReductionMode::Mean => "mean",
            ReductionMode::CountMean => "count_mean",
            ReductionMode::Sum => "sum",
            ReductionMode::Summary5 => "summary5",
        }
    }
}

/// Every control the UI owns, passed explicitly into each pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Equality constraints by column name; `"All"` means unconstrained.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    /// Grouping columns, outermost first.
    pub group_by: Vec<String>,
    #[serde(default)]
    pub value_field: Option<String>,
    /// Columns summed per group by the `sum` reduction.
    #[serde(default)]
    pub stack_fields: Vec<String>,
    #[serde(default)]
    pub reduction: ReductionMode,
    #[serde(default)]
    pub sort: SortOrder,
    /// Fixed bucket width per numeric grouping column; columns absent here group by exact value.
    #[serde(default)]
    pub bin_widths: BTreeMap<String, f64>,
    /// Number of equal-width bins over the observed extent; takes precedence over `bin_widths`.
    #[serde(default)]
    pub extent_bins: BTreeMap<String, usize>,
}

impl PipelineConfig {
    pub fn grouped_by<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_reduction(mut self, reduction: ReductionMode, value_field: Option<&str>) -> Self {
        self.reduction = reduction;
        self.value_field = value_field.map(str::to_string);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, field: &str, value: FilterValue) -> Self {
        self.filters.insert(field.to_string(), value);
        self
    }

    pub fn with_bin_width(mut self, field: &str, width: f64) -> Self {
        self.bin_widths.insert(field.to_string(), width);
        self
    }

    /// Bin `field` using its default dashboard width.
    pub fn with_default_bin_width(self, field: FieldId) -> Self {
        self.with_bin_width(field.column_name(), field.default_bin_width())
    }

    pub fn with_extent_bins(mut self, field: &str, bins: usize) -> Self {
        self.extent_bins.insert(field.to_string(), bins);
        self
    }

    pub fn with_stack_fields(mut self, fields: &[FieldId]) -> Self {
        self.stack_fields = fields.iter().map(|f| f.column_name().to_string()).collect();
        self
    }

    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::sort::{SortDirection, SortKey};

    #[test]
    fn parses_minimal_json() {
        let cfg = PipelineConfig::from_json(r#"{"group_by": ["Sleep_Quality"]}"#).unwrap();
        assert_eq!(cfg.group_by, vec!["Sleep_Quality"]);
        assert_eq!(cfg.reduction, ReductionMode::Count);
        assert_eq!(cfg.sort, SortOrder::default());
        assert!(cfg.filters.is_empty());
    }

    #[test]
    fn parses_full_json() {
        let cfg = PipelineConfig::from_json(
            r#"{
                "filters": {"Gender": "Female", "University_Year": "All"},
                "group_by": ["Study_Hours"],
                "value_field": "Sleep_Duration",
                "reduction": "summary5",
                "sort": {"key": "value", "direction": "descending"},
                "bin_widths": {"Study_Hours": 2}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.reduction, ReductionMode::Summary5);
        assert_eq!(cfg.sort, SortOrder::new(SortKey::Value, SortDirection::Descending));
        assert_eq!(cfg.bin_widths["Study_Hours"], 2.0);
        assert_eq!(cfg.filters["Gender"], FilterValue::Text("Female".into()));
    }

    #[test]
    fn builder_sets_default_width() {
        let cfg = PipelineConfig::grouped_by(["Physical_Activity"]).with_default_bin_width(FieldId::PhysicalActivity);
        assert_eq!(cfg.bin_widths["Physical_Activity"], 5.0);
    }

    #[test]
    fn missing_group_by_is_rejected() {
        assert!(PipelineConfig::from_json("{}").is_err());
    }
}
