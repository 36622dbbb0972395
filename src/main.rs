// src/main.rs
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use sqlx::postgres::PgPoolOptions;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gym_backoffice::config::Settings;
use gym_backoffice::{api, docs, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            log::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            log::error!("failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!().run(&pool).await {
        log::error!("failed to run migrations: {e}");
        std::process::exit(1);
    }

    if settings.read_only {
        log::warn!("APP_ENV={} : API is read-only, writes will be rejected", settings.app_env);
    }

    let state = web::Data::new(AppState {
        pool,
        read_only: settings.read_only,
    });

    log::info!("listening on {}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .configure(api::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
