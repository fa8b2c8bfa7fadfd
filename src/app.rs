//! app.rs
use crate::handlers::reminder_handler;
use actix_web::{http::Method, web};

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api").service(
            web::scope("/reminders").service(
                web::resource("/run")
                    .route(web::post().to(reminder_handler::run_reminders_endpoint))
                    .route(
                        web::method(Method::OPTIONS)
                            .to(reminder_handler::run_reminders_preflight),
                    ),
            ),
        ),
    );
}
