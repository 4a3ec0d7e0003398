use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::engine::EngineError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported file type: {0}. Please upload a PDF, PNG or JPG.")]
    UnsupportedMedia(String),
    #[error("The uploaded file is empty.")]
    EmptyUpload,
    #[error("The uploaded file exceeds {0} bytes.")]
    UploadTooLarge(usize),
    #[error("Missing form field: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidField { name: &'static str, value: String },
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("OCR failed.")]
    OcrFailed,
    #[error("The uploaded file ({uploaded}) does not match the queued document ({expected}).")]
    FilenameMismatch { expected: String, uploaded: String },
    #[error("{0} is not waiting for review.")]
    NotPending(String),
    #[error("AI failed to return valid JSON.")]
    InvalidExtraction(String),
    #[error("Extraction engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::UnsupportedMedia(_)
            | PipelineError::EmptyUpload
            | PipelineError::MissingField(_)
            | PipelineError::InvalidField { .. }
            | PipelineError::Multipart(_)
            | PipelineError::OcrFailed
            | PipelineError::FilenameMismatch { .. } => StatusCode::BAD_REQUEST,
            PipelineError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::NotPending(_) => StatusCode::NOT_FOUND,
            PipelineError::InvalidExtraction(_) | PipelineError::Engine(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }
        HttpResponse::build(status).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
