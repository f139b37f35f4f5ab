//! Model artifact: the serialized bundle of ensemble + transform + metrics.

mod artifact;

pub use artifact::{ModelArtifact, Prediction, ARTIFACT_FORMAT_VERSION};
