use actix_web::{HttpResponse, http::header::ContentType, web};
use log::error;
use serde::Deserialize;

use crate::{
    config::RateMode, currency::Currency, state::AppState, vehicles::list_vehicles, views,
};

#[derive(Debug, Deserialize)]
pub struct ExchangeQuery {
    base: Option<String>,
}

fn html(page: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}

pub async fn home(state: web::Data<AppState>) -> HttpResponse {
    html(views::home(&state.config.route_prefix))
}

pub async fn exchange(
    state: web::Data<AppState>,
    query: web::Query<ExchangeQuery>,
) -> HttpResponse {
    let mode = state.config.rate_mode;
    let base = match mode {
        RateMode::Derived => Currency::parse_or_default(query.base.as_deref().unwrap_or("USD")),
        RateMode::UsdAnchored => Currency::Usd,
    };

    let prefix = &state.config.route_prefix;
    let page = match state.rates.rate_table(base).await {
        Ok(table) => views::exchange(prefix, mode, base, Ok(&table)),
        Err(e) => views::exchange(prefix, mode, base, Err(&e.page_message())),
    };

    html(page)
}

pub async fn vehicles(state: web::Data<AppState>) -> HttpResponse {
    let prefix = &state.config.route_prefix;

    let page = match list_vehicles(&state.db).await {
        Ok(list) => views::vehicles(prefix, &list, None),
        Err(e) => {
            error!("Vehicles page failed: {}", e);
            views::vehicles(prefix, &[], Some(&e.page_message()))
        }
    };

    html(page)
}
