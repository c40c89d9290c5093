use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use taskflow_api::config::{ApiConfig, CorsConfig};
use taskflow_api::handlers;
use taskflow_api::helpers::database::{get_db_path, initialize_database};
use taskflow_api::helpers::security::TokenService;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// SQLite database file, overrides `[database] path` from the config
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn init_tracing(log_file_path: Option<String>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("taskflow-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

fn build_cors(config: Option<&CorsConfig>) -> Cors {
    let cors = match config {
        Some(cors_config) => {
            let mut cors_builder = Cors::default().supports_credentials();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
        }
        None => Cors::default().allow_any_origin(),
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file_path);

    let (config, config_path) = ApiConfig::load().context("Failed to load config")?;
    tracing::info!("Loaded config from {:?}", config_path);

    let db_path = get_db_path(args.db_path, &config)?;
    let db = initialize_database(&db_path).context("Failed to initialize database")?;
    tracing::info!("Database initialized at {:?}", db_path);

    if config.auth.jwt_secret == ApiConfig::default().auth.jwt_secret {
        tracing::warn!("Using the default JWT secret, set TASKFLOW__AUTH__JWT_SECRET");
    }

    let tokens = web::Data::new(TokenService::from_config(&config.auth));
    let auth_config = web::Data::new(config.auth.clone());

    let (host, port) = match &config.server {
        Some(server_config) => (server_config.host.clone(), server_config.port),
        None => ("127.0.0.1".to_string(), 8000),
    };

    tracing::info!("Starting server on {}:{}", host, port);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(cors_config.as_ref()))
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(tokens.clone())
            .app_data(auth_config.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await?;
    Ok(())
}
