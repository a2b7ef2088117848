// File: services/appliance_backend/src/main.rs
mod service_factory;

use appliance_api::routes;
use appliance_common::logging;
use appliance_config::load_config;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::service_factory::ApplianceServiceFactory;

/// CORS for the configured front-end origins; any origin when none are listed.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            logging::init();
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    // Held for the life of the process so buffered file logs are flushed.
    let _log_guard = logging::init_with_config(&config.logging);

    let factory = ApplianceServiceFactory::new(&config)?;
    if factory.is_mock_mode() {
        warn!("Supabase is not configured; every request runs as the mock user");
    }

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut app = routes(Arc::new(factory.api_state()));

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use appliance_api::doc::ApplianceApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("📖 Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApplianceApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    let app = app
        .layer(cors_layer(&config.cors.allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

