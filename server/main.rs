mod error;
mod routes;

use actix_web::{middleware, web, App, HttpServer};
use section_control::data::sample_network;
use section_control::{EngineSettings, ScheduleOptimizer};
use std::env;

/// Settings from `SETTINGS_FILE` if set, then environment overrides
fn load_settings() -> EngineSettings {
    let from_file = env::var("SETTINGS_FILE").ok().and_then(|path| {
        let loaded = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| EngineSettings::from_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring settings file {path}: {e}");
                None
            }
        }
    });
    from_file.unwrap_or_default().with_env_overrides()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get port from environment or default to 8080
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let settings = load_settings();
    let controller = sample_network().map_err(|e| std::io::Error::other(e.to_string()))?;
    log::info!("{controller}, safety margin {} min", settings.safety_margin_minutes);

    let state = web::Data::new(routes::AppState::new(controller, ScheduleOptimizer::new(settings)));

    log::info!("Starting server on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
