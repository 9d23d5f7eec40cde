use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use konvo_shared::clients::db::{create_pool, DbPool};
use konvo_shared::clients::rabbitmq::RabbitMQClient;
use konvo_shared::middleware::{init_metrics, metrics_middleware};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    konvo_shared::middleware::init_tracing("konvo-user");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq });

    let metrics_handle = init_metrics();

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        // Own profile
        .route(
            "/me",
            get(routes::profile::get_profile)
                .put(routes::profile::complete_profile)
                .patch(routes::profile::update_profile),
        )
        .route("/me/deactivate", post(routes::profile::deactivate_profile))
        .route("/me/reactivate", post(routes::profile::reactivate_profile))
        // Referral program
        .route("/referral", get(routes::referral::get_referral_info))
        // Admin surface
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/stats", get(routes::admin::get_stats))
        .route("/admin/users/:id/ban", post(routes::admin::ban_user))
        .route("/admin/users/:id/toggle-active", post(routes::admin::toggle_active))
        .route("/admin/users/:id/credits", post(routes::admin::grant_credits))
        .route("/admin/broadcast", post(routes::admin::request_broadcast))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "konvo-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
