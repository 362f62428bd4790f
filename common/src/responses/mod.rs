use crate::model::dataset::{Dataset, Record};
use serde::Serialize;

/// Body of a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session: String,
    pub md5: String,
    /// True when the file is byte-identical to the session's previous upload.
    pub unchanged: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// One pipeline step as reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub step: String,
    pub applied: bool,
    pub detail: String,
}

/// Body of `GET /api/records/view`.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    #[serde(flatten)]
    pub data: Dataset,
    pub report: Vec<StepSummary>,
}
