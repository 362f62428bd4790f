//! # Records Service Module
//!
//! Endpoints under `/api/records` that manage the session's customer list.
//!
//! *   **`POST /upload`**: multipart upload with a `file` part (`.xlsx`, `.xlsm`,
//!     `.xls`, `.ods` or `.csv`). The sheet becomes the session's original
//!     dataset, any previous view is dropped and the session cookie is set.
//! *   **`GET /view`**: runs the view pipeline over the original using the
//!     query string (`name_filter`, `rms_filter`, `pin_filter`,
//!     `filter[COLUMN]`, `sort`, `dedup`, `action`) and stores the result as
//!     the view that labels are printed from.
//! *   **`POST /clear`**: forgets everything stored for the session.
//! *   **`GET /export/expired`**: expired-customers workbook built from the
//!     original dataset.

mod clear;
mod export;
mod upload;
mod view;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/records";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/view", get().to(view::process))
        .route("/clear", post().to(clear::process))
        .route("/export/expired", get().to(export::process))
}
