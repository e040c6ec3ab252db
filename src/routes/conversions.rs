use actix_web::{HttpResponse, web};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::{
    conversions::{NewConversion, history_limit, recent_conversions, save_conversion},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<String>,
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<NewConversion>,
) -> Result<HttpResponse, AppError> {
    let conversion = body.into_inner().validate()?;
    let saved = save_conversion(&state.db, &conversion).await?;

    info!(
        "Saved conversion {} {} -> {}",
        saved.id, conversion.from, conversion.to
    );
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "id": saved.id,
        "created_at": saved.created_at,
    })))
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = history_limit(query.limit.as_deref());
    let conversions = recent_conversions(&state.db, limit).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "conversions": conversions,
    })))
}
