use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::data::schema::{FieldId, Schema};
use crate::error::Error;
use crate::state::config::{PipelineConfig, ReductionMode};

/// Chart shapes offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Scatter,
    Bubble,
    BoxPlot,
    StackedBar,
}

/// Activities stacked per age group in the mental-health dataset.
pub const STACKED_ACTIVITIES: [FieldId; 5] = [
    FieldId::SleepHours,
    FieldId::ScreenTimeHours,
    FieldId::TechnologyUsageHours,
    FieldId::GamingHours,
    FieldId::SocialMediaUsageHours,
];

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Bubble,
        ChartKind::BoxPlot,
        ChartKind::StackedBar,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Bubble => "Bubble Chart",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::StackedBar => "Stacked Bar Chart",
        }
    }

    /// Dataset variant the preset's fields belong to.
    pub fn schema(&self) -> Schema {
        match self {
            ChartKind::StackedBar => Schema::MentalHealth,
            _ => Schema::StudentSleep,
        }
    }

    /// Default chart for a freshly loaded dataset.
    pub fn default_for(schema: Schema) -> ChartKind {
        match schema {
            Schema::StudentSleep => ChartKind::Bar,
            Schema::MentalHealth => ChartKind::StackedBar,
        }
    }

    /// The pipeline configuration the dashboard starts this chart with.
    pub fn preset(&self) -> PipelineConfig {
        match self {
            ChartKind::Bar => PipelineConfig::grouped_by([FieldId::SleepQuality.column_name()]),
            ChartKind::Scatter => PipelineConfig::grouped_by([
                FieldId::StudyHours.column_name(),
                FieldId::SleepDuration.column_name(),
                FieldId::UniversityYear.column_name(),
            ]),
            ChartKind::Bubble => PipelineConfig::grouped_by([
                FieldId::CaffeineIntake.column_name(),
                FieldId::PhysicalActivity.column_name(),
            ])
            .with_bin_width(FieldId::PhysicalActivity.column_name(), 20.0)
            .with_reduction(ReductionMode::CountMean, Some(FieldId::SleepQuality.column_name())),
            ChartKind::BoxPlot => PipelineConfig::grouped_by([FieldId::StudyHours.column_name()])
                .with_extent_bins(FieldId::StudyHours.column_name(), 5)
                .with_reduction(ReductionMode::Summary5, Some(FieldId::SleepDuration.column_name())),
            ChartKind::StackedBar => PipelineConfig::grouped_by([FieldId::AgeGroup.column_name()])
                .with_stack_fields(&STACKED_ACTIVITIES)
                .with_reduction(ReductionMode::Sum, None),
        }
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "bar" => Ok(ChartKind::Bar),
            "scatter" => Ok(ChartKind::Scatter),
            "bubble" => Ok(ChartKind::Bubble),
            "box" | "box_plot" | "boxplot" => Ok(ChartKind::BoxPlot),
            "stacked" | "stacked_bar" => Ok(ChartKind::StackedBar),
            _ => Err(Error::UnknownChart(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::pipeline::Plan;

    #[test]
    fn presets_resolve_against_their_schema() {
        for kind in ChartKind::ALL {
            let plan = Plan::resolve(&kind.preset(), kind.schema());
            assert!(plan.is_ok(), "{} preset failed: {:?}", kind.label(), plan.err());
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("Box Plot".parse::<ChartKind>().unwrap(), ChartKind::BoxPlot);
        assert_eq!("stacked-bar".parse::<ChartKind>().unwrap(), ChartKind::StackedBar);
        assert!(matches!("pie".parse::<ChartKind>(), Err(Error::UnknownChart(_))));
    }

    #[test]
    fn default_chart_per_schema() {
        assert_eq!(ChartKind::default_for(Schema::MentalHealth), ChartKind::StackedBar);
        assert_eq!(ChartKind::default_for(Schema::StudentSleep), ChartKind::Bar);
    }
}
