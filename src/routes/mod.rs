mod conversions;
mod pages;

use actix_web::web;
use log::warn;

use crate::error::AppError;

/// Mounts every route under `prefix` ("" or "/segment").
pub fn configure(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.service(
        web::scope(prefix)
            .app_data(json_config())
            .route("/", web::get().to(pages::home))
            .route("/exchange", web::get().to(pages::exchange))
            .route("/vehicles", web::get().to(pages::vehicles))
            .service(
                web::resource("/api/conversions")
                    .route(web::post().to(conversions::create))
                    .route(web::get().to(conversions::list)),
            ),
    );
}

/// Malformed bodies are client errors with the usual JSON error shape.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {}", err);
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    })
}
