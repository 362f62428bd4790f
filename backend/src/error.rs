use crate::labels::RenderError;
use crate::pipeline::PipelineError;
use crate::session::StoreError;
use crate::tabular::TabularError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::MissingField;
use thiserror::Error;

pub const NO_DATA: &str = "No data available.";
pub const NO_DATA_EXCEL: &str = "No data available for Excel download.";
pub const NO_DATA_PDF: &str = "No data available for PDF conversion.";

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    /// The session has nothing to work on. Not a failure from the client's
    /// point of view, so it answers 200 with the message.
    #[error("{0}")]
    NoData(&'static str),
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Tabular(#[from] TabularError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoData(_) => StatusCode::OK,
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pipeline(PipelineError::MissingField(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pipeline(PipelineError::DatePattern(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Pipeline(_) => StatusCode::BAD_REQUEST,
            AppError::Tabular(TabularError::MissingField(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Tabular(TabularError::Export(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Tabular(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Render(_) | AppError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::NoData(message) => message.to_string(),
            other => format!("Error: {}", other),
        };
        if status.is_server_error() {
            log::error!("{}", self);
        } else if status != StatusCode::OK {
            log::warn!("{}", self);
        }
        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status() {
        assert_eq!(AppError::NoData(NO_DATA).status_code(), StatusCode::OK);
        assert_eq!(
            AppError::from(MissingField::new("PIN")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(PipelineError::MissingField(MissingField::new("CLOSING DATE")))
                .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(TabularError::UnsupportedFile("a.txt".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::Io(std::io::Error::other("disk"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
