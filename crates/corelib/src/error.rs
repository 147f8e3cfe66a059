use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("expected three comma-separated numbers, got '{0}'")]
    InvalidVector(String),
    #[error("no scene object with id {0}")]
    UnknownObject(u32),
}

pub type CoreResult<T> = Result<T, CoreError>;
