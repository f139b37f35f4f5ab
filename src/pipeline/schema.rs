//! Loan application schema: the raw record type and its required columns.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Name of the binary target column in training data.
pub const TARGET_COLUMN: &str = "defaulted";

/// Columns that must be present in every input dataset.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "loan_id",
    "loan_amnt",
    "term",
    "emp_length",
    "home_ownership",
    "annual_inc",
    "purpose",
    "dti",
    "delinq_2yrs",
    "open_acc",
    "pub_rec",
    "revol_util",
    "total_acc",
];

/// Low-cardinality categorical columns encoded via one-hot.
pub const ONE_HOT_COLUMNS: [&str; 3] = ["term", "home_ownership", "purpose"];

/// Monotonic continuous columns encoded via weight of evidence.
pub const WOE_COLUMNS: [&str; 2] = ["dti", "revol_util"];

/// One loan application, immutable once read.
///
/// `issue_d` (ISO date) is optional and only consulted when a macro-economic
/// table was fitted into the transform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: i64,
    pub loan_amnt: f64,
    pub term: String,
    pub emp_length: f64,
    pub home_ownership: String,
    pub annual_inc: f64,
    pub purpose: String,
    pub dti: f64,
    pub delinq_2yrs: f64,
    pub open_acc: f64,
    pub pub_rec: f64,
    pub revol_util: f64,
    pub total_acc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_d: Option<String>,
}

impl LoanRecord {
    /// Check every numeric field for NaN or infinity.
    ///
    /// Encoders and the tree ensemble both assume finite inputs, so a
    /// non-finite value is rejected before it reaches them.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(ScoreError::Validation(format!(
                    "field '{}' must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Numeric fields as (name, value) pairs, in schema order.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 9] {
        [
            ("loan_amnt", self.loan_amnt),
            ("emp_length", self.emp_length),
            ("annual_inc", self.annual_inc),
            ("dti", self.dti),
            ("delinq_2yrs", self.delinq_2yrs),
            ("open_acc", self.open_acc),
            ("pub_rec", self.pub_rec),
            ("revol_util", self.revol_util),
            ("total_acc", self.total_acc),
        ]
    }

    /// Value of a one-hot encoded categorical column by name.
    pub fn categorical_value(&self, column: &str) -> &str {
        match column {
            "term" => &self.term,
            "home_ownership" => &self.home_ownership,
            "purpose" => &self.purpose,
            _ => "",
        }
    }

    /// Value of a WoE-encoded continuous column by name.
    pub fn continuous_value(&self, column: &str) -> f64 {
        match column {
            "dti" => self.dti,
            "revol_util" => self.revol_util,
            _ => f64::NAN,
        }
    }
}
