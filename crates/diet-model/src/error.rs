use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Inconsistent bounds or a dangling reference found while building the model
    #[error("Invalid model ({0}): {1}")]
    InvalidModel(String, String),
    #[error("Unknown food: {0}")]
    UnknownFood(String),
    #[error("Unknown nutrient: {0}")]
    UnknownNutrient(String),
    #[error("Invalid quantity for {0}: {1}")]
    InvalidQuantity(String, f64),
    #[error("IO error: {0}")]
    Io(String),
}

impl ModelError {
    pub(crate) fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidModel(subject.into(), reason.into())
    }
}
