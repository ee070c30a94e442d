use hub_common::ResourceStatus;
use thiserror::Error;

use crate::domain::repository::RepositoryError;

/// Why a lifecycle operation did not complete.
///
/// A missing resource is not an error: operations report it as `Ok(None)`
/// or `Ok(false)`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("moderator role required")]
    Forbidden,

    #[error("resource cannot be moved to status {0}")]
    InvalidTransition(ResourceStatus),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
