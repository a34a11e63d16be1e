use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid facility catalog ({} problem(s)): {}", .0.len(), summarize(.0))]
    InvalidCatalog(Vec<ValidationError>),

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
