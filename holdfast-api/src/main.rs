use holdfast_api::{app, state::AppState};
use holdfast_booking::{run_sweeper, BookingService};
use holdfast_core::BookingRules;
use holdfast_inventory::FlightServiceClient;
use holdfast_store::{DbClient, PostgresLedger};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holdfast_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = holdfast_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Holdfast API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let inventory = Arc::new(FlightServiceClient::new(config.inventory.base_url.clone()));
    let rules = BookingRules::from_seconds(config.booking_rules.payment_window_seconds);
    let bookings = Arc::new(BookingService::new(
        PostgresLedger::new(db.pool.clone()),
        inventory,
        rules,
    ));

    tokio::spawn(run_sweeper(
        bookings.clone(),
        Duration::from_secs(config.booking_rules.sweep_interval_seconds),
    ));

    let app_state = AppState { bookings };
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
