//! Lendscore: Loan Default Risk Library
//!
//! A library for scoring loan-application default risk: data loading,
//! WoE/one-hot/target-encoded feature engineering, GBDT training with
//! random hyperparameter search, and model artifact serving.

pub mod batch;
pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod serve;
pub mod train;
pub mod utils;
