use crate::services::model_service::ModelKind;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("A model with ID = {0} already exists, choose another ID")]
    DuplicateModelId(String),
    #[error("No trained model with ID = {0} exists")]
    UnknownModelId(String),
    #[error("Unknown model kind: {0}")]
    UnknownModelKind(String),
    #[error("Parameter {param} for model {model} not found")]
    InvalidHyperparameter { model: ModelKind, param: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Dataset error: {0}")]
    Dataset(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = match self {
            AppError::DuplicateModelId(_)
            | AppError::UnknownModelId(_)
            | AppError::UnknownModelKind(_)
            | AppError::InvalidHyperparameter { .. }
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Dataset(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status == StatusCode::BAD_REQUEST {
            // Caller errors carry the message itself as a JSON-encoded string.
            (status, Json(serde_json::Value::String(message))).into_response()
        } else {
            (status, Json(serde_json::json!({ "error": message }))).into_response()
        }
    }
}

impl From<smartcore::error::Failed> for AppError {
    fn from(err: smartcore::error::Failed) -> Self {
        AppError::Internal(format!("Model library error: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization/deserialization error: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
