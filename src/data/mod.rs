pub mod loader;
pub mod parser;
pub mod record;
pub mod schema;
pub mod unit_inference;
