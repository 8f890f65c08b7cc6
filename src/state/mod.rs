pub mod chart_kind;
pub mod config;
pub mod dashboard;
