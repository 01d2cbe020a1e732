use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::{Datelike, Utc};

use hrms::config::Config;
use hrms::db::init_db;
use hrms::docs::ApiDoc;
use hrms::routes;
use hrms::utils::holiday_cache;
use hrms::utils::timezone::to_civil_date;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM service is running"
}

fn startup_error(e: anyhow::Error) -> std::io::Error {
    std::io::Error::other(format!("{:#}", e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(startup_error)?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.run_migrations)
        .await
        .map_err(startup_error)?;

    holiday_cache::init(config.holiday_cache_capacity, config.holiday_cache_ttl());

    let pool_for_cache_warmup = pool.clone();
    let this_year = to_civil_date(Utc::now()).year();

    actix_web::rt::spawn(async move {
        // current and next civil year cover nearly every new application
        if let Err(e) =
            holiday_cache::warmup_holiday_cache(&pool_for_cache_warmup, &[this_year, this_year + 1])
                .await
        {
            error!(error = %e, "Failed to warmup holiday cache");
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let config_data = config.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // protected routes with rate limiting
            .configure(move |cfg| routes::configure(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await
}
