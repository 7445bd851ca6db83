use thiserror::Error;
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("unknown entity type '{0}'")]
    UnknownEntityType(String),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}
