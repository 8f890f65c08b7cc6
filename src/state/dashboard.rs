use std::sync::Arc;
use crate::data::record::Dataset;
use crate::error::Result;
use crate::processing::filter::FilterValue;
use crate::processing::pipeline::{Pipeline, PipelineOutcome, Stage};
use crate::processing::sort::SortOrder;
use crate::state::chart_kind::ChartKind;
use crate::state::config::{PipelineConfig, ReductionMode};

/// A single UI control change. Every change re-runs the whole pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlChange {
    SetFilter { field: String, value: FilterValue },
    ClearFilter { field: String },
    ClearFilters,
    GroupBy(Vec<String>),
    ValueField(Option<String>),
    Reduction(ReductionMode),
    Sort(SortOrder),
    BinWidth { field: String, width: f64 },
    ExtentBins { field: String, bins: usize },
    Chart(ChartKind),
}

impl ControlChange {
    fn apply_to(self, config: &mut PipelineConfig) {
        match self {
            ControlChange::SetFilter { field, value } => {
                config.filters.insert(field, value);
            }
            ControlChange::ClearFilter { field } => {
                config.filters.remove(&field);
            }
            ControlChange::ClearFilters => config.filters.clear(),
            ControlChange::GroupBy(fields) => config.group_by = fields,
            ControlChange::ValueField(field) => config.value_field = field,
            ControlChange::Reduction(mode) => config.reduction = mode,
            ControlChange::Sort(order) => config.sort = order,
            ControlChange::BinWidth { field, width } => {
                config.bin_widths.insert(field, width);
            }
            ControlChange::ExtentBins { field, bins } => {
                config.extent_bins.insert(field, bins);
            }
            ControlChange::Chart(kind) => {
                // a chart switch keeps the active filters
                let filters = std::mem::take(&mut config.filters);
                *config = kind.preset();
                config.filters = filters;
            }
        }
    }
}

/// The dashboard session: one shared dataset, the current controls and the
/// latest pipeline outcome.
#[derive(Debug)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    config: PipelineConfig,
    pipeline: Pipeline,
    outcome: PipelineOutcome,
    generation: u64,
}

impl Dashboard {
    /// Open a session on `dataset` with the default chart for its schema.
    pub fn new(dataset: Dataset) -> Result<Self> {
        let config = ChartKind::default_for(dataset.schema).preset();
        Self::with_config(dataset, config)
    }

    pub fn with_config(dataset: Dataset, config: PipelineConfig) -> Result<Self> {
        let dataset = Arc::new(dataset);
        let mut pipeline = Pipeline::new();
        let outcome = pipeline.run(&dataset, &config)?;
        Ok(Self {
            dataset,
            config,
            pipeline,
            outcome,
            generation: 1,
        })
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn outcome(&self) -> &PipelineOutcome {
        &self.outcome
    }

    pub fn stage(&self) -> Stage {
        self.pipeline.stage()
    }

    /// Number of completed runs; the latest run's outcome is the current one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply a control change and re-run. An invalid change leaves the
    /// previous controls and outcome in place.
    pub fn apply(&mut self, change: ControlChange) -> Result<&PipelineOutcome> {
        let mut candidate = self.config.clone();
        change.apply_to(&mut candidate);
        self.rerun(candidate)
    }

    /// Replace the dataset wholesale and re-run the current controls.
    /// If they do not fit the new schema, the schema's default chart is used.
    pub fn reload(&mut self, dataset: Dataset) -> Result<&PipelineOutcome> {
        let schema = dataset.schema;
        self.dataset = Arc::new(dataset);
        tracing::info!("Dataset replaced: {} records ({} schema)", self.dataset.len(), schema);
        let config = self.config.clone();
        match self.pipeline.run(&self.dataset, &config) {
            Ok(outcome) => {
                self.commit(config, outcome);
                Ok(&self.outcome)
            }
            Err(e) if e.is_config_error() => {
                tracing::warn!("Current controls do not fit the new dataset ({e}); using defaults");
                self.rerun(ChartKind::default_for(schema).preset())
            }
            Err(e) => Err(e),
        }
    }

    fn rerun(&mut self, config: PipelineConfig) -> Result<&PipelineOutcome> {
        let outcome = self.pipeline.run(&self.dataset, &config)?;
        self.commit(config, outcome);
        Ok(&self.outcome)
    }

    fn commit(&mut self, config: PipelineConfig, outcome: PipelineOutcome) {
        self.config = config;
        self.outcome = outcome;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Record, Value};
    use crate::data::schema::{FieldId, Schema};
    use crate::error::Error;
    use crate::processing::sort::{SortDirection, SortKey};

    fn students() -> Dataset {
        let rows = [("Male", 3.0, 1.0), ("Female", 7.0, 4.0), ("Male", 7.0, 5.0), ("Other", 5.0, 2.0)];
        let records = rows
            .iter()
            .map(|(g, q, h)| {
                Record::from_pairs(
                    Schema::StudentSleep,
                    [
                        (FieldId::Gender, Value::Text(g.to_string())),
                        (FieldId::SleepQuality, Value::Number(*q)),
                        (FieldId::StudyHours, Value::Number(*h)),
                        (FieldId::SleepDuration, Value::Number(6.0 + h)),
                    ],
                )
            })
            .collect();
        Dataset::new(Schema::StudentSleep, records)
    }

    fn labels(outcome: &PipelineOutcome) -> Vec<String> {
        outcome.chart().map(|c| c.groups.iter().map(|g| g.label.clone()).collect()).unwrap_or_default()
    }

    #[test]
    fn every_change_reruns() {
        let mut dash = Dashboard::new(students()).unwrap();
        assert_eq!(dash.generation(), 1);
        assert_eq!(labels(dash.outcome()), vec!["3", "5", "7"]);

        dash.apply(ControlChange::Sort(SortOrder::new(SortKey::GroupKey, SortDirection::Descending))).unwrap();
        assert_eq!(labels(dash.outcome()), vec!["7", "5", "3"]);
        assert_eq!(dash.generation(), 2);

        dash.apply(ControlChange::SetFilter { field: "Gender".into(), value: FilterValue::Text("Male".into()) })
            .unwrap();
        assert_eq!(labels(dash.outcome()), vec!["7", "3"]);
        assert_eq!(dash.generation(), 3);
    }

    #[test]
    fn filter_excluding_everything_reports_no_data() {
        let mut dash = Dashboard::new(students()).unwrap();
        let outcome = dash
            .apply(ControlChange::SetFilter { field: "Gender".into(), value: FilterValue::Text("Nobody".into()) })
            .unwrap();
        assert!(outcome.is_no_data());
        assert_eq!(dash.stage(), Stage::NoData);

        dash.apply(ControlChange::ClearFilters).unwrap();
        assert_eq!(dash.stage(), Stage::Ready);
    }

    #[test]
    fn invalid_change_keeps_previous_state() {
        let mut dash = Dashboard::new(students()).unwrap();
        let before = dash.outcome().clone();
        let err = dash.apply(ControlChange::GroupBy(vec!["Age_Group".into()])).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
        assert_eq!(dash.outcome(), &before);
        assert_eq!(dash.config().group_by, vec!["Sleep_Quality"]);
        assert_eq!(dash.generation(), 1);
    }

    #[test]
    fn chart_switch_keeps_filters() {
        let mut dash = Dashboard::new(students()).unwrap();
        dash.apply(ControlChange::SetFilter { field: "Gender".into(), value: FilterValue::Text("Male".into()) })
            .unwrap();
        dash.apply(ControlChange::Chart(ChartKind::BoxPlot)).unwrap();
        assert_eq!(dash.config().reduction, ReductionMode::Summary5);
        assert!(dash.config().filters.contains_key("Gender"));
        assert_eq!(dash.outcome().chart().unwrap().filtered, 2);
    }

    #[test]
    fn reload_falls_back_to_schema_default() {
        let mut dash = Dashboard::new(students()).unwrap();
        let mental = Dataset::new(
            Schema::MentalHealth,
            vec![Record::from_pairs(
                Schema::MentalHealth,
                [
                    (FieldId::AgeGroup, Value::Text("18-24".into())),
                    (FieldId::SleepHours, Value::Number(7.0)),
                    (FieldId::ScreenTimeHours, Value::Number(4.0)),
                    (FieldId::TechnologyUsageHours, Value::Number(6.0)),
                    (FieldId::GamingHours, Value::Number(1.0)),
                    (FieldId::SocialMediaUsageHours, Value::Number(2.0)),
                ],
            )],
        );
        dash.reload(mental).unwrap();
        assert_eq!(dash.config().reduction, ReductionMode::Sum);
        assert_eq!(labels(dash.outcome()), vec!["18-24"]);
        assert_eq!(dash.dataset().schema, Schema::MentalHealth);
    }
}
