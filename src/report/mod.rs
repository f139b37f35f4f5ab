//! Training report generation

pub mod summary;

pub use summary::{display_trial_leaderboard, TrainingSummary};
