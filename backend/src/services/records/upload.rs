use crate::error::AppError;
use crate::session::{SessionId, Slot};
use crate::state::AppState;
use crate::tabular::ingest::{self, SourceFormat};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::responses::UploadResponse;
use futures_util::StreamExt;
use log::info;
use md5::Context;

/// On success returns the parsed sheet as JSON and (re)sets the session cookie.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    match upload_records(&req, &state, payload).await {
        Ok((session, body)) => HttpResponse::Ok().cookie(session.cookie()).json(body),
        Err(e) => e.error_response(),
    }
}

struct Upload {
    filename: String,
    format: SourceFormat,
    bytes: Vec<u8>,
    md5: String,
}

/// Reads the `file` part, hashing it while it streams in. Other parts are
/// ignored.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, AppError> {
    let mut upload = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Upload(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        let format = SourceFormat::from_filename(&filename)?;

        let mut md5_hasher = Context::new();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::Upload(e.to_string()))?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::Upload(format!(
                    "file is larger than {} MB",
                    limit / (1024 * 1024)
                )));
            }
            md5_hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(Upload {
            filename,
            format,
            bytes,
            md5: format!("{:x}", md5_hasher.finalize()),
        });
    }

    upload.ok_or_else(|| AppError::Upload("missing 'file' part".into()))
}

async fn upload_records(
    req: &HttpRequest,
    state: &AppState,
    payload: Multipart,
) -> Result<(SessionId, UploadResponse), AppError> {
    let upload = read_upload(payload, state.config.max_upload_bytes).await?;
    let Upload {
        filename,
        format,
        bytes,
        md5,
    } = upload;

    let dataset = tokio::task::spawn_blocking(move || ingest::read(format, bytes)).await??;

    let session = SessionId::from_request(req).unwrap_or_default();
    let unchanged = state.store.digest(&session)?.as_deref() == Some(md5.as_str());
    state.store.set(&session, Slot::Original, &dataset)?;
    state.store.delete(&session, Slot::View)?;
    state.store.set_digest(&session, &md5)?;

    info!(
        "session {}: uploaded '{}' ({} rows, {} columns, md5 {}{})",
        session,
        filename,
        dataset.len(),
        dataset.columns().len(),
        md5,
        if unchanged { ", unchanged" } else { "" }
    );

    let (columns, rows) = dataset.into_parts();
    Ok((
        session,
        UploadResponse {
            session: session.to_string(),
            md5,
            unchanged,
            columns,
            rows,
        },
    ))
}
