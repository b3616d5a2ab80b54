//! Error types for the pool

use thiserror::Error;

/// Errors produced while constructing or retiring pooled resources.
///
/// Both variants wrap the factory's own error type. `Create` is returned
/// from the acquisition path; `Remove` is produced during housekeeping,
/// where the pool logs it rather than surfacing it to callers.
#[derive(Error, Debug)]
pub enum PoolError<E> {
    #[error("resource construction failed: {0}")]
    Create(E),

    #[error("resource removal failed: {0}")]
    Remove(E),
}

impl<E> PoolError<E> {
    /// Unwrap the factory error regardless of which phase produced it.
    pub fn into_inner(self) -> E {
        match self {
            PoolError::Create(error) => error,
            PoolError::Remove(error) => error,
        }
    }
}

pub type PoolResult<T, E> = Result<T, PoolError<E>>;
