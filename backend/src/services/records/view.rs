use crate::error::{AppError, NO_DATA};
use crate::pipeline::{self, plans};
use crate::session::{SessionId, Slot};
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use chrono::Local;
use common::requests::ViewQuery;
use common::responses::ViewResponse;
use log::info;

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ViewQuery>,
) -> impl Responder {
    match view_records(&req, &state, query.into_inner()).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => e.error_response(),
    }
}

/// Recomputes the view from the original and stores it for label printing.
async fn view_records(
    req: &HttpRequest,
    state: &AppState,
    query: ViewQuery,
) -> Result<ViewResponse, AppError> {
    let session = SessionId::from_request(req).ok_or(AppError::NoData(NO_DATA))?;
    let original = state
        .store
        .get(&session, Slot::Original)?
        .ok_or(AppError::NoData(NO_DATA))?;

    let plan = plans::view_plan(&query, Local::now().naive_local())?;
    let total = original.len();
    let view = tokio::task::spawn_blocking(move || pipeline::apply(&original, &plan)).await??;
    state.store.set(&session, Slot::View, &view.dataset)?;

    info!(
        "session {}: view has {} of {} rows",
        session,
        view.dataset.len(),
        total
    );

    let report = view.summaries();
    Ok(ViewResponse {
        data: view.dataset,
        report,
    })
}
