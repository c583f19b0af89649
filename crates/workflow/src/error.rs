use dbt_core::error::CoreError;

/// Failure of a workflow operation.
///
/// Domain rejections carry a [`CoreError`]; anything the database or the
/// document store could not do is reported as unavailable and the
/// transaction, if any, has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Document store unavailable: {0}")]
    DocumentStoreUnavailable(#[from] std::io::Error),
}

impl WorkflowError {
    /// The domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Core(CoreError::Validation(errors.to_string()))
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
