use crate::error::AppError;
use crate::session::SessionId;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use log::info;

/// Drops the session's files and expires its cookie. Clearing without a
/// session is not an error.
pub async fn process(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match clear_session(&req, &state) {
        Ok(()) => HttpResponse::NoContent()
            .cookie(SessionId::removal_cookie())
            .finish(),
        Err(e) => e.error_response(),
    }
}

fn clear_session(req: &HttpRequest, state: &AppState) -> Result<(), AppError> {
    if let Some(session) = SessionId::from_request(req) {
        let removed = state.store.clear(&session)?;
        info!("session {}: cleared ({} files)", session, removed);
    }
    Ok(())
}
