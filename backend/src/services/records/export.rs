use crate::error::{AppError, NO_DATA_EXCEL};
use crate::pipeline::{self, plans};
use crate::session::{SessionId, Slot};
use crate::state::AppState;
use crate::tabular::export::{self, EXPIRED_FILENAME, XLSX_CONTENT_TYPE};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use chrono::Local;
use log::info;

pub async fn process(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match export_expired(&req, &state).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(XLSX_CONTENT_TYPE)
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPIRED_FILENAME),
            ))
            .body(bytes),
        Err(e) => e.error_response(),
    }
}

/// Customers whose closing date falls between the start of last month and
/// the end of next month, one row per contact. Built from the original
/// upload, not the current view.
async fn export_expired(req: &HttpRequest, state: &AppState) -> Result<Vec<u8>, AppError> {
    let session = SessionId::from_request(req).ok_or(AppError::NoData(NO_DATA_EXCEL))?;
    let original = state
        .store
        .get(&session, Slot::Original)?
        .ok_or(AppError::NoData(NO_DATA_EXCEL))?;

    let plan = plans::expired_export_plan(Local::now().date_naive());
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let view = pipeline::apply(&original, &plan)?;
        Ok(export::expired_customers(&view.dataset)?)
    })
    .await??;

    info!("session {}: expired-customers workbook, {} bytes", session, bytes.len());
    Ok(bytes)
}
