use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrimitivesError {
    #[error("Unit formatting error: {0}")]
    UnitsError(String),
}

pub type Result<T> = core::result::Result<T, PrimitivesError>;
