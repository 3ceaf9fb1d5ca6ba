use crate::model::leave_request::{InvalidTransition, LeaveStatus};
use crate::repository::RepositoryError;
use crate::storage::StorageError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures raised by the leave lifecycle. The boundary layer turns each
/// kind into a status code through [`ResponseError`].
#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "Leave request not found with id: {}", _0)]
    NotFound(u64),

    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    #[display(fmt = "Cannot move leave request from {} to {}", from, to)]
    InvalidTransition { from: LeaveStatus, to: LeaveStatus },

    #[display(fmt = "File upload failed: {}", _0)]
    Upload(StorageError),

    #[display(fmt = "{}", _0)]
    Store(RepositoryError),
}

impl std::error::Error for LeaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaveError::Upload(e) => Some(e),
            LeaveError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl LeaveError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LeaveError::InvalidInput(message.into())
    }
}

impl From<InvalidTransition> for LeaveError {
    fn from(e: InvalidTransition) -> Self {
        LeaveError::InvalidTransition {
            from: e.from,
            to: e.to,
        }
    }
}

impl From<RepositoryError> for LeaveError {
    fn from(e: RepositoryError) -> Self {
        LeaveError::Store(e)
    }
}

impl From<StorageError> for LeaveError {
    fn from(e: StorageError) -> Self {
        LeaveError::Upload(e)
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LeaveError::InvalidTransition { .. } => StatusCode::CONFLICT,
            LeaveError::Upload(_) => StatusCode::BAD_GATEWAY,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // store errors may carry SQL details, keep them in the log only
        let message = match self {
            LeaveError::Store(e) => {
                tracing::error!(error = %e, "Leave store failure");
                "An error occurred while processing the leave request".to_string()
            }
            LeaveError::Upload(e) => {
                tracing::error!(error = %e, "Document upload failure");
                self.to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status).json(json!({ "message": message }))
    }
}
