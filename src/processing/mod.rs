pub mod aggregate;
pub mod binning;
pub mod filter;
pub mod pipeline;
pub mod sort;
pub mod statistics;
