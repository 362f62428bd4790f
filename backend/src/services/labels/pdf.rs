use crate::error::{AppError, NO_DATA_PDF};
use crate::labels;
use crate::session::{SessionId, Slot};
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::requests::LabelQuery;
use log::info;

const PDF_FILENAME: &str = "customer_labels.pdf";

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LabelQuery>,
) -> impl Responder {
    match labels_pdf(&req, &state, &query).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", PDF_FILENAME),
            ))
            .body(bytes),
        Err(e) => e.error_response(),
    }
}

async fn labels_pdf(
    req: &HttpRequest,
    state: &AppState,
    query: &LabelQuery,
) -> Result<Vec<u8>, AppError> {
    let session = SessionId::from_request(req).ok_or(AppError::NoData(NO_DATA_PDF))?;
    let view = state
        .store
        .get(&session, Slot::View)?
        .filter(|v| !v.is_empty())
        .ok_or(AppError::NoData(NO_DATA_PDF))?;

    let layout = query.layout;
    let sender = state.config.sender.clone();
    let fonts = state.fonts.clone();
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let document = labels::paginate(&view, layout, &sender)?;
        Ok(labels::render(&document, &fonts)?)
    })
    .await??;

    info!(
        "session {}: {:?} labels, {} bytes",
        session,
        layout,
        bytes.len()
    );
    Ok(bytes)
}
