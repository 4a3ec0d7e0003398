mod auth;
mod config;
mod engine;
mod pipeline;
mod routes;
mod store;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use auth::jwt::JwtService;
use auth::middleware::AuthMiddleware;
use config::ServiceConfig;
use engine::http::HttpExtractionEngine;
use pipeline::{DocumentPipeline, TriagePolicy};
use routes::{UploadLimit, configure_routes};
use std::sync::Arc;
use store::ledger::Ledger;
use store::queue::ReviewQueueStore;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServiceConfig::load().map_err(|e| startup_error("Invalid configuration", e))?;
    log::info!(
        "Review threshold {:.2}, amount ceiling {}, engine at {}",
        config.review_threshold,
        config.amount_ceiling,
        config.engine.base_url
    );

    let engine = HttpExtractionEngine::new(&config.engine)
        .map_err(|e| startup_error("Failed to set up extraction engine client", e))?;
    let pipeline = web::Data::new(DocumentPipeline::new(
        Arc::new(engine),
        ReviewQueueStore::open(&config.queue_path),
        Ledger::open(&config.ledger_path).map_err(|e| startup_error("Failed to open ledger", e))?,
        TriagePolicy::from(&config),
    ));
    let upload_limit = web::Data::new(UploadLimit(config.max_upload_bytes));
    let auth_middleware = AuthMiddleware::new(JwtService::new(&config.jwt_secret));

    let frontend_dir = config.frontend_dir.clone().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!("Frontend directory {} not found; serving API only", dir.display());
        }
        exists
    });
    let allowed_origin = config.allowed_origin.clone();

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        };
        App::new()
            .wrap(Logger::default())
            .wrap(
                cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .app_data(upload_limit.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone(), auth_middleware.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
