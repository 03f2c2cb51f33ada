use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};

use crate::adapters::api::{ApiState, configure_routes};
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::SqliteReadingService;

pub fn run(config: AppConfig) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(AppError::database_init)?;
    }

    let mut connection =
        crate::adapters::db::open_connection(&config.db_path).map_err(AppError::database_init)?;
    crate::adapters::db::run_migrations(&mut connection).map_err(AppError::database_init)?;

    let shared_connection = Arc::new(Mutex::new(connection));
    let api_state = ApiState {
        readings: SqliteReadingService::new(Arc::clone(&shared_connection)),
    };

    tracing::info!(bind = %config.http_bind, "http server starting");

    let allowed_origin = config.cors_allowed_origin.clone();
    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                let cors = match &allowed_origin {
                    Some(origin) => Cors::default()
                        .allowed_origin(origin)
                        .allow_any_method()
                        .allow_any_header(),
                    None => Cors::permissive(),
                };

                App::new()
                    .wrap(cors)
                    .app_data(web::Data::new(api_state.clone()))
                    .configure(configure_routes)
            })
            .bind(&config.http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}
