//! Pipeline module - loading, schema, and feature engineering

pub mod features;
pub mod loader;
pub mod schema;
pub mod split;
pub mod woe;

pub use features::{FitOptions, MacroTable, TransformConfig, OTHER_CATEGORY};
pub use loader::{extract_records, extract_target, load_dataset, save_dataset, validate_schema};
pub use schema::{LoanRecord, REQUIRED_COLUMNS, TARGET_COLUMN};
pub use split::{stratified_split, take};
pub use woe::WoeEncoder;
