//! handlers/reminder_handler.rs
//! Trigger HTTP que llama el scheduler externo.

use actix_web::{web, HttpResponse, HttpResponseBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::{models::reminder_model::RunReminderResponse, services::reminder_service::ReminderService};

#[derive(Deserialize)]
pub struct RunQuery {
    details: Option<bool>,
}

fn with_cors(mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    builder
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header((
            "Access-Control-Allow-Headers",
            "authorization, content-type",
        ));
    builder
}

/// OPTIONS /api/reminders/run (preflight, no corre el batch)
pub async fn run_reminders_preflight() -> HttpResponse {
    with_cors(HttpResponse::Ok()).finish()
}

/// POST /api/reminders/run
pub async fn run_reminders_endpoint(
    reminder_service: web::Data<ReminderService>,
    query: web::Query<RunQuery>,
) -> HttpResponse {
    let with_details = query.details.unwrap_or(false);

    match reminder_service.run().await {
        Ok(summary) => with_cors(HttpResponse::Ok())
            .json(RunReminderResponse::from_summary(summary, with_details)),
        Err(e) => {
            log::error!("Reminder run error: {:?}", e);
            with_cors(HttpResponse::InternalServerError()).json(json!({
                "success": false,
                "error": format!("{:#}", e)
            }))
        }
    }
}
