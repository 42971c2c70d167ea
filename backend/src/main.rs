mod ai;
mod config;
mod directory;
mod error;
mod identify;
mod routes;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use ai::GeminiClient;
use config::{AppConfig, UploadLimits};
use directory::PlantDirectory;
use identify::{EndemicClassifier, EndemicKeywords, PlantIdentifier};
use routes::configure_routes;

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", what, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config =
        AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let keywords = match &config.endemic_keywords_path {
        Some(path) => EndemicKeywords::load(path),
        None => EndemicKeywords::builtin(),
    }
    .map_err(|e| startup_error("Failed to load endemic keywords", e))?;
    log::info!("Endemic classifier loaded {} keywords", keywords.len());

    let directory = match &config.plant_directory_path {
        Some(path) => PlantDirectory::load(path),
        None => PlantDirectory::builtin(),
    }
    .map_err(|e| startup_error("Failed to load plant directory", e))?;
    if directory.is_empty() {
        log::warn!("Plant directory is empty");
    }

    if !config.gemini.has_api_key() {
        log::warn!(
            "GEMINI_API_KEY is not set. Identification requests will fail until it is configured."
        );
    }
    let gemini = GeminiClient::new(&config.gemini)
        .map_err(|e| startup_error("Invalid Gemini settings", e))?;
    log::info!("Using Gemini endpoint {}", gemini.endpoint());

    let identifier = PlantIdentifier::new(Arc::new(gemini), EndemicClassifier::new(keywords));
    let limits = UploadLimits::from(&config);

    let static_dir = if config.static_dir.is_dir() {
        log::info!("Serving static files from {}", config.static_dir.display());
        Some(config.static_dir.clone())
    } else {
        log::warn!(
            "Static directory {} not found, serving the API only",
            config.static_dir.display()
        );
        None
    };

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .expose_headers(vec!["X-Scan-Id"])
                    .max_age(3600),
            )
            .app_data(web::Data::new(identifier.clone()))
            .app_data(web::Data::new(directory.clone()))
            .app_data(web::Data::new(limits))
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
