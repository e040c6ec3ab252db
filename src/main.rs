use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;
use config::AppConfig;
use log::info;
use state::AppState;

mod config;
mod conversions;
mod currency;
mod db;
mod error;
mod exchange_rate;
mod live_quotes;
mod rate_fetcher;
mod routes;
mod state;
mod vehicles;
mod views;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let bind = (config.bind.clone(), config.port);
    let prefix = config.route_prefix.clone();
    info!(
        "Starting on {}:{} (prefix '{}', rate mode {:?})",
        bind.0, bind.1, prefix, config.rate_mode
    );

    let state = web::Data::new(AppState::new(config)?);

    let app_state = state.clone();
    HttpServer::new(move || {
        let prefix = prefix.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(move |cfg| routes::configure(cfg, &prefix))
    })
    .bind(bind)?
    .run()
    .await?;

    state.db.close().await;
    info!("Shut down");

    Ok(())
}
