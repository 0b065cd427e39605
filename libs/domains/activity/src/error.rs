use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Unknown activity action: {0}")]
    UnknownAction(String),

    #[error("Audit store error: {0}")]
    Storage(String),
}

pub type ActivityResult<T> = Result<T, ActivityError>;

/// Convert ActivityError to AppError for standardized error responses
impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::UnknownAction(action) => {
                AppError::BadRequest(format!("Unknown activity action: {}", action))
            }
            ActivityError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ActivityError {
    fn from(err: mongodb::error::Error) -> Self {
        ActivityError::Storage(err.to_string())
    }
}
