//! tests/handler_tests.rs
//! Trigger HTTP: preflight, corrida exitosa y error fatal.

use std::sync::Arc;

use actix_web::{http::Method, http::StatusCode, test, web, App};
use serde_json::Value;

use crate::app::init_app;
use crate::services::reminder_service::ReminderService;

use super::support::{
    invoice, recipient, service, MemoryDirectory, MemoryInvoiceStore, RecordingProvider,
};

fn one_due_invoice(provider: Arc<RecordingProvider>, fail_reads: bool) -> ReminderService {
    let store = MemoryInvoiceStore {
        fail_reads,
        ..MemoryInvoiceStore::with(vec![invoice("inv-1", "u1", 3, 0)])
    };
    service(
        Arc::new(store),
        MemoryDirectory::with(vec![recipient("u1", Some("ana@example.com"))]),
        provider,
    )
}

#[actix_rt::test]
async fn preflight_does_not_run_the_batch() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(one_due_invoice(provider.clone(), false)))
            .configure(init_app),
    )
    .await;

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/api/reminders/run")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );
    assert_eq!(provider.attempts(), 0);
}

#[actix_rt::test]
async fn post_runs_batch_and_returns_count() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(one_due_invoice(provider.clone(), false)))
            .configure(init_app),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["remindersSent"], 1);
    assert!(body.get("outcomes").is_none());
    assert_eq!(provider.attempts(), 1);
}

#[actix_rt::test]
async fn details_flag_includes_outcomes() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(one_due_invoice(provider, false)))
            .configure(init_app),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run?details=true")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["remindersSent"], 1);
    assert_eq!(body["outcomes"][0]["invoiceId"], "inv-1");
    assert_eq!(body["outcomes"][0]["outcome"]["kind"], "sent");
    assert!(body["runId"].is_string());
}

#[actix_rt::test]
async fn selection_failure_returns_error_result() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(one_due_invoice(provider.clone(), true)))
            .configure(init_app),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Bulk invoice read failed"));
    assert_eq!(provider.attempts(), 0);
}
