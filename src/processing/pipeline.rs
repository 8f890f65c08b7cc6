//! Filter → aggregate → sort, run from scratch for every control change.

use serde::{Deserialize, Serialize};
use crate::data::record::Dataset;
use crate::data::schema::{FieldId, Schema};
use crate::data::unit_inference::axis_label;
use crate::error::{Error, Result};
use crate::processing::aggregate::{self, AggregateGroup, KeySpec, Reduction};
use crate::processing::binning;
use crate::processing::filter::FilterSet;
use crate::processing::sort::{self, SortOrder};
use crate::state::config::{PipelineConfig, ReductionMode};

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Idle,
    Filtering,
    Aggregating,
    Sorting,
    Ready,
    NoData,
}

/// A config checked against a schema, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub filters: FilterSet,
    pub keys: Vec<KeySpec>,
    pub reduction: Reduction,
    pub mode: ReductionMode,
    pub value_field: Option<FieldId>,
    pub sort: SortOrder,
}

impl Plan {
    /// Resolve every field name in `config` against `schema`.
    ///
    /// Unknown fields, numeric operations on categorical fields and bad bin
    /// settings are reported here, before any record is touched.
    pub fn resolve(config: &PipelineConfig, schema: Schema) -> Result<Self> {
        if config.group_by.is_empty() {
            return Err(Error::NoGroupField);
        }
        let filters = FilterSet::resolve(schema, &config.filters)?;

        for (name, width) in &config.bin_widths {
            let field = schema.resolve_numeric(name)?;
            binning::validate_width(field, *width)?;
        }
        for (name, bins) in &config.extent_bins {
            schema.resolve_numeric(name)?;
            if *bins == 0 {
                return Err(Error::InvalidBinCount { field: name.clone(), count: *bins });
            }
        }

        let keys = config
            .group_by
            .iter()
            .map(|name| -> Result<KeySpec> {
                let field = schema.resolve(name)?;
                Ok(if !field.is_numeric() {
                    KeySpec::Category(field)
                } else if let Some(bins) = config.extent_bins.get(name) {
                    KeySpec::Extent { field, bins: *bins }
                } else if let Some(width) = config.bin_widths.get(name) {
                    KeySpec::Bucket { field, width: *width }
                } else {
                    KeySpec::Value(field)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let value_field = config
            .value_field
            .as_deref()
            .map(|name| schema.resolve_numeric(name))
            .transpose()?;
        let require_value = || value_field.ok_or_else(|| Error::MissingValueField(config.reduction.label().to_string()));

        let reduction = match config.reduction {
            ReductionMode::Count => Reduction::Count,
            ReductionMode::Mean => Reduction::Mean(require_value()?),
            ReductionMode::CountMean => Reduction::CountMean(require_value()?),
            ReductionMode::Summary5 => Reduction::FiveNumber(require_value()?),
            ReductionMode::Sum => {
                let mut fields = config
                    .stack_fields
                    .iter()
                    .map(|name| schema.resolve_numeric(name))
                    .collect::<Result<Vec<_>>>()?;
                if fields.is_empty() {
                    fields.push(require_value()?);
                }
                Reduction::Sum(fields)
            }
        };

        Ok(Self {
            filters,
            keys,
            reduction,
            mode: config.reduction,
            value_field,
            sort: config.sort,
        })
    }
}

/// Everything a chart renderer needs: ordered groups plus axis labelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub key_fields: Vec<FieldId>,
    pub key_labels: Vec<String>,
    pub value_field: Option<FieldId>,
    pub value_label: Option<String>,
    pub reduction: ReductionMode,
    pub sort: SortOrder,
    pub groups: Vec<AggregateGroup>,
    /// Records left after filtering.
    pub filtered: usize,
    /// Filtered records excluded for missing or invalid values.
    pub dropped: usize,
}

impl ChartData {
    /// Plain-text rendering of the groups, one block or line per group.
    pub fn report(&self) -> String {
        use crate::processing::aggregate::Summary;

        let mut out = format!(
            "{} by {} ({} records, {} dropped)\n",
            self.value_label.as_deref().unwrap_or("Count"),
            self.key_labels.join(" / "),
            self.filtered,
            self.dropped
        );
        for g in &self.groups {
            match &g.summary {
                Summary::Count { count } => out.push_str(&format!("  {}: {}\n", g.label, count)),
                Summary::Mean { mean } => out.push_str(&format!("  {}: {:.3}\n", g.label, mean)),
                Summary::CountMean { count, mean } => {
                    out.push_str(&format!("  {}: {} (mean {:.3})\n", g.label, count, mean))
                }
                Summary::Sums { totals } => {
                    let parts: Vec<String> = totals.iter().map(|t| format!("{}={:.3}", t.field, t.total)).collect();
                    out.push_str(&format!("  {}: {}\n", g.label, parts.join(", ")));
                }
                Summary::FiveNumber(s) => out.push_str(&s.report(&format!("  {}", g.label))),
            }
        }
        out
    }
}

/// Result of one run: groups to draw, or a signal to clear the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Ready(ChartData),
    NoData { filtered: usize, dropped: usize },
}

impl PipelineOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(self, PipelineOutcome::NoData { .. })
    }

    pub fn chart(&self) -> Option<&ChartData> {
        match self {
            PipelineOutcome::Ready(data) => Some(data),
            PipelineOutcome::NoData { .. } => None,
        }
    }
}

/// Drives one dataset through the stages, recording where it stopped.
#[derive(Debug, Default)]
pub struct Pipeline {
    stage: Stage,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("pipeline {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    pub fn run(&mut self, dataset: &Dataset, config: &PipelineConfig) -> Result<PipelineOutcome> {
        let plan = Plan::resolve(config, dataset.schema)?;
        self.stage = Stage::Idle;

        self.enter(Stage::Filtering);
        let filtered = plan.filters.apply(dataset.records());
        tracing::debug!(
            "{} filter constraint(s) kept {} of {} records",
            plan.filters.len(),
            filtered.len(),
            dataset.len()
        );
        if filtered.is_empty() {
            return Ok(self.no_data(0, 0));
        }

        self.enter(Stage::Aggregating);
        let aggregation = aggregate::aggregate(&filtered, &plan.keys, &plan.reduction);
        if aggregation.groups.is_empty() {
            return Ok(self.no_data(filtered.len(), aggregation.dropped));
        }

        self.enter(Stage::Sorting);
        let mut groups = aggregation.groups;
        sort::sort_groups(&mut groups, plan.sort);

        self.enter(Stage::Ready);
        let key_fields: Vec<FieldId> = plan.keys.iter().map(KeySpec::field).collect();
        tracing::info!(
            "{} groups from {} records ({} dropped)",
            groups.len(),
            filtered.len(),
            aggregation.dropped
        );
        Ok(PipelineOutcome::Ready(ChartData {
            key_labels: key_fields.iter().map(|f| axis_label(*f)).collect(),
            key_fields,
            value_label: plan.value_field.map(axis_label),
            value_field: plan.value_field,
            reduction: plan.mode,
            sort: plan.sort,
            groups,
            filtered: filtered.len(),
            dropped: aggregation.dropped,
        }))
    }

    fn no_data(&mut self, filtered: usize, dropped: usize) -> PipelineOutcome {
        self.enter(Stage::NoData);
        tracing::warn!("No data to display ({filtered} records after filtering, {dropped} dropped)");
        PipelineOutcome::NoData { filtered, dropped }
    }
}

/// Run the full pipeline once.
pub fn run(dataset: &Dataset, config: &PipelineConfig) -> Result<PipelineOutcome> {
    Pipeline::new().run(dataset, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Record, Value};
    use crate::processing::aggregate::Summary;
    use crate::processing::filter::FilterValue;

    fn dataset(rows: &[(&str, f64)]) -> Dataset {
        let records = rows
            .iter()
            .map(|(gender, quality)| {
                Record::from_pairs(
                    Schema::StudentSleep,
                    [
                        (FieldId::Gender, Value::Text(gender.to_string())),
                        (FieldId::SleepQuality, Value::Number(*quality)),
                    ],
                )
            })
            .collect();
        Dataset::new(Schema::StudentSleep, records)
    }

    #[test]
    fn stages_end_in_ready() {
        let ds = dataset(&[("Male", 3.0), ("Female", 7.0)]);
        let mut pipeline = Pipeline::new();
        let outcome = pipeline.run(&ds, &PipelineConfig::grouped_by(["Sleep_Quality"])).unwrap();
        assert_eq!(pipeline.stage(), Stage::Ready);
        let chart = outcome.chart().unwrap();
        assert_eq!(chart.key_fields, vec![FieldId::SleepQuality]);
        assert_eq!(chart.key_labels, vec!["Sleep Quality (1-10)"]);
        assert_eq!(chart.filtered, 2);
    }

    #[test]
    fn empty_filter_result_short_circuits() {
        let ds = dataset(&[("Male", 3.0)]);
        let cfg = PipelineConfig::grouped_by(["Sleep_Quality"]).with_filter("Gender", FilterValue::Text("Other".into()));
        let mut pipeline = Pipeline::new();
        let outcome = pipeline.run(&ds, &cfg).unwrap();
        assert_eq!(outcome, PipelineOutcome::NoData { filtered: 0, dropped: 0 });
        assert_eq!(pipeline.stage(), Stage::NoData);
    }

    #[test]
    fn all_values_invalid_is_no_data() {
        let ds = Dataset::new(
            Schema::StudentSleep,
            vec![Record::from_pairs(Schema::StudentSleep, [(FieldId::Gender, Value::Text("Male".into()))])],
        );
        let outcome = run(&ds, &PipelineConfig::grouped_by(["Sleep_Quality"])).unwrap();
        assert_eq!(outcome, PipelineOutcome::NoData { filtered: 1, dropped: 1 });
    }

    #[test]
    fn unknown_field_is_an_error_not_no_data() {
        let ds = dataset(&[]);
        let err = run(&ds, &PipelineConfig::grouped_by(["Age_Group"])).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
        assert!(err.is_config_error());
    }

    #[test]
    fn plan_validation() {
        let schema = Schema::StudentSleep;
        let missing_value = PipelineConfig::grouped_by(["Gender"]).with_reduction(ReductionMode::Mean, None);
        assert!(matches!(Plan::resolve(&missing_value, schema), Err(Error::MissingValueField(_))));

        let categorical_value = PipelineConfig::grouped_by(["Gender"]).with_reduction(ReductionMode::Mean, Some("University_Year"));
        assert!(matches!(Plan::resolve(&categorical_value, schema), Err(Error::FieldKind { .. })));

        let bad_width = PipelineConfig::grouped_by(["Study_Hours"]).with_bin_width("Study_Hours", 0.0);
        assert!(matches!(Plan::resolve(&bad_width, schema), Err(Error::InvalidBinWidth { .. })));

        let bad_bins = PipelineConfig::grouped_by(["Study_Hours"]).with_extent_bins("Study_Hours", 0);
        assert!(matches!(Plan::resolve(&bad_bins, schema), Err(Error::InvalidBinCount { .. })));

        assert!(matches!(Plan::resolve(&PipelineConfig::default(), schema), Err(Error::NoGroupField)));
    }

    #[test]
    fn plan_picks_key_specs() {
        let cfg = PipelineConfig::grouped_by(["Gender", "Study_Hours", "Sleep_Duration", "Age"])
            .with_bin_width("Study_Hours", 2.0)
            .with_extent_bins("Sleep_Duration", 5)
            .with_bin_width("Sleep_Duration", 1.0);
        let plan = Plan::resolve(&cfg, Schema::StudentSleep).unwrap();
        assert_eq!(
            plan.keys,
            vec![
                KeySpec::Category(FieldId::Gender),
                KeySpec::Bucket { field: FieldId::StudyHours, width: 2.0 },
                KeySpec::Extent { field: FieldId::SleepDuration, bins: 5 },
                KeySpec::Value(FieldId::Age),
            ]
        );
    }

    #[test]
    fn report_lists_groups() {
        let ds = dataset(&[("Male", 3.0), ("Female", 3.0), ("Male", 7.0)]);
        let outcome = run(&ds, &PipelineConfig::grouped_by(["Sleep_Quality"])).unwrap();
        let report = outcome.chart().unwrap().report();
        assert!(report.starts_with("Count by Sleep Quality (1-10) (3 records, 0 dropped)\n"));
        assert!(report.contains("  3: 2\n"));
        assert!(report.contains("  7: 1\n"));
        assert!(matches!(outcome.chart().unwrap().groups[0].summary, Summary::Count { count: 2 }));
    }
}
