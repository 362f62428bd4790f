//! Label printing under `/api/labels`.
//!
//! `GET /pdf?layout=envelope|grid` renders the session's current view (the
//! last `GET /api/records/view` result) as a PDF attachment. `envelope`, the
//! default, prints one record per page with the sender's address; `grid`
//! packs 50 records per A4 landscape sheet.

mod pdf;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/labels";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/pdf", get().to(pdf::process))
}
