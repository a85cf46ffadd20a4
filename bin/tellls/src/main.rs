//! # Tellls Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod config;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use config::Config;
use std::sync::Arc;
use tl_api::middleware::{cors_policy, security_headers, standard_middleware};
use tl_api::{configure_routes, AppState};

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("tellls needs the `db-sqlite` and `auth-simple` features");

#[cfg(feature = "db-sqlite")]
use tl_db_sqlite::SqliteTelllRepo;

#[cfg(feature = "auth-simple")]
use tl_auth_simple::SimpleAuthProvider;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    // 1. Database
    #[cfg(feature = "db-sqlite")]
    let repo = Arc::new(
        SqliteTelllRepo::connect(&config.database.url, config.database.max_connections)
            .await
            .with_context(|| format!("failed to open {}", config.database.url))?,
    );

    // 2. Auth
    #[cfg(feature = "auth-simple")]
    let auth = match config.session_secret.as_deref() {
        Some(secret) => SimpleAuthProvider::new(secret),
        None => {
            log::warn!("SESSION_SECRET is not set; sessions will not survive a restart");
            SimpleAuthProvider::ephemeral()?
        }
    };

    let state = web::Data::new(AppState {
        tellls: repo.clone(),
        accounts: repo,
        auth: Box::new(auth),
        page_size: config.feed_page_size,
    });

    let (host, port) = (config.app.host.clone(), config.app.port);
    let origins = config.cors_allowed_origins.clone();
    log::info!("Tellls ({}) starting on http://{}:{}", config.app.env, host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(security_headers())
            .wrap(cors_policy(&origins))
            .wrap(standard_middleware())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
