use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod credits;
mod events;
mod game;
mod matching;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use konvo_shared::clients::db::{create_pool, DbPool};
use konvo_shared::clients::rabbitmq::RabbitMQClient;
use konvo_shared::clients::redis::RedisClient;
use konvo_shared::middleware::{init_metrics, metrics_middleware};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    konvo_shared::middleware::init_tracing("konvo-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
    });

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
        // Candidate selection and decisions
        .route("/candidates/next", get(routes::candidates::next_candidate))
        .route("/decisions", post(routes::decisions::record_decision))
        // Match and like listings
        .route("/matches", get(routes::matches::list_matches))
        .route("/likes/received", get(routes::matches::likes_received))
        // Matched-pair messaging
        .route(
            "/conversations/:user_id/messages",
            get(routes::conversations::list_messages).post(routes::conversations::send_message),
        )
        // Would You Rather mini-game
        .route("/game/:partner_id/start", post(routes::game::start_game))
        .route("/game/answer", post(routes::game::answer_game))
        .route(
            "/game/:partner_id/compatibility",
            get(routes::game::get_compatibility),
        )
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "konvo-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
