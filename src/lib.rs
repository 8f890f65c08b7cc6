//! Aggregation core of a survey charting dashboard.
//!
//! Survey records are loaded from CSV ([`data::loader`]), filtered, grouped and
//! reduced ([`processing`]), then ordered and handed to a chart renderer as
//! [`processing::pipeline::ChartData`].

pub mod data;
pub mod error;
pub mod processing;
pub mod state;

pub use error::{Error, Result};
pub use processing::pipeline::{run, ChartData, PipelineOutcome};
pub use state::config::PipelineConfig;
