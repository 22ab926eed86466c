use std::fmt;

use pushkind_common::repository::errors::RepositoryError;
use thiserror::Error;

use crate::storage::StorageError;

pub mod products;

/// Record kinds a service lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Product,
    Category,
    ProductType,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Product => "product",
            Entity::Category => "category",
            Entity::ProductType => "product type",
        };
        f.write_str(name)
    }
}

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user lacks the role required by the service.
    #[error("unauthorized")]
    Unauthorized,
    /// Submitted form data failed validation.
    #[error("{0}")]
    Form(String),
    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(Entity),
    /// Writing or removing a stored file failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// Any other persistence failure.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

/// Result type returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound(Entity::Product),
            other => ServiceError::Repository(other),
        }
    }
}
