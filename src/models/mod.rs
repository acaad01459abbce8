use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of one classification run, as emitted by the inference backend
/// and returned to the client verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}
