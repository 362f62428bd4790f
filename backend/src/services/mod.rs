//! HTTP surface. Each sub-module is one actix scope.

pub mod labels;
pub mod records;

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::error::{NO_DATA, NO_DATA_EXCEL, NO_DATA_PDF};
    use crate::pipeline::DATE_FORMAT;
    use crate::session::{FsSessionStore, SESSION_COOKIE};
    use crate::state::AppState;
    use crate::tabular::export::EXPIRED_COLUMNS;
    use crate::tabular::ingest::tests::ingest;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use chrono::Local;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    const BOUNDARY: &str = "labeldesk-test-boundary";

    fn state(dir: &TempDir) -> AppState {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: dir.path().to_path_buf(),
            fonts_dir: PathBuf::from("/nonexistent"),
            max_upload_bytes: 1024 * 1024,
            sender: vec!["SENDER".into()],
        };
        let store = FsSessionStore::open(dir.path()).unwrap();
        AppState::new(Arc::new(store), config)
    }

    fn multipart(filename: &str, content: &str) -> (String, String) {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }

    fn customers_csv() -> String {
        let today = Local::now().date_naive();
        let closing = today.format(DATE_FORMAT).to_string();
        let mut csv = EXPIRED_COLUMNS.join(",");
        csv.push_str(",RMS,PIN\n");
        for (name, rms) in [("Ravi", "KKD"), ("Asha", "CLT"), ("Ravi", "KKD")] {
            csv.push_str(&format!(
                "{name},1 Main St,Malaparamba,Kozhikode,Kozhikode,111,Kerala,01-01-2023,12,{closing},ACTIVE,Sreeja,KKD-04,999,{rms},673009\n"
            ));
        }
        csv
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(super::records::configure_routes())
                    .service(super::labels::configure_routes()),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn no_session_means_no_data() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir));

        for (uri, message) in [
            ("/api/records/view", NO_DATA),
            ("/api/records/export/expired", NO_DATA_EXCEL),
            ("/api/labels/pdf", NO_DATA_PDF),
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let body = test::read_body(resp).await;
            assert_eq!(body, message.as_bytes(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn upload_view_export_clear() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir));

        let (content_type, body) = multipart("customers.csv", &customers_csv());
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/records/upload")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie: Cookie<'static> = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();
        let uploaded: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(uploaded["rows"].as_array().unwrap().len(), 3);
        assert_eq!(uploaded["unchanged"], false);

        let view: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/records/view?name_filter=RAVI&dedup=all")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(view["rows"].as_array().unwrap().len(), 1);
        assert_eq!(view["columns"].as_array().unwrap().len(), EXPIRED_COLUMNS.len() + 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/records/export/expired")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert!(disposition.to_str().unwrap().contains("expired_customers.xlsx"));
        let workbook = test::read_body(resp).await;
        let exported = ingest("expired_customers.xlsx", workbook.to_vec()).unwrap();
        assert_eq!(exported.columns(), &EXPIRED_COLUMNS);
        // contact dedup folds the two identical Ravi rows
        assert_eq!(exported.len(), 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/records/clear")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get()
                .uri("/api/records/view")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(body, NO_DATA.as_bytes());
    }

    #[actix_web::test]
    async fn clear_action_runs_the_date_filter() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir));

        let (content_type, body) = multipart("customers.csv", &customers_csv());
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/records/upload")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();

        // every row closes today, which has already begun
        let view: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/records/view?action=clear_repetitions_expired")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(view["rows"].as_array().unwrap().len(), 0);
        assert_eq!(view["report"][0]["step"], "date_filter(CLOSING DATE)");
        assert_eq!(view["report"][0]["detail"], "3 rows removed");

        let (content_type, body) =
            multipart("short.csv", "NAME,CLOSING DATE\nRavi,15-03-2099\nAsha,01-03-24\n");
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/records/upload")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/records/view?action=clear_repetitions_expired")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("'01-03-24'"));
    }

    #[actix_web::test]
    async fn bad_uploads_are_rejected() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir));

        for (filename, content) in [("notes.txt", "hello"), ("c.csv", "NAME,,PIN\na,b,c")] {
            let (content_type, body) = multipart(filename, content);
            let resp = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/records/upload")
                    .insert_header((header::CONTENT_TYPE, content_type))
                    .set_payload(body)
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{filename}");
        }
    }

    #[actix_web::test]
    async fn missing_label_column_is_unprocessable() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir));

        let (content_type, body) = multipart("c.csv", "NAME,PIN\nRavi,673009\n");
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/records/upload")
                .insert_header((header::CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
            .unwrap();

        // the default sort keys are absent, so the sort step is skipped
        let view: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/records/view")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(view["report"][0]["applied"], false);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/labels/pdf?layout=grid")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
