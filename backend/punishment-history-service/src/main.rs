use actix_web::{middleware::Logger, web, App, HttpServer};
use db_pool::LazyPool;
use punishment_history_service::{
    config::Config,
    db::PgRowExecutor,
    handlers::{self, PagingSettings},
    services::PunishmentLedger,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_level(true))
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    tracing::info!("Starting Punishment History Service...");

    let config = Config::from_env()?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        http_port = %config.http_port,
        "Configuration loaded"
    );

    // Connections are only opened once the first query arrives
    let pool = Arc::new(LazyPool::new(config.db_config()));
    let executor = Arc::new(
        PgRowExecutor::new(pool.clone()).with_statement_timeout(config.statement_timeout()),
    );

    let ledger = PunishmentLedger::new(executor).map_err(|e| {
        tracing::error!("Refusing to start: {}", e);
        e
    })?;
    tracing::info!("Union projections verified");

    let ledger = web::Data::new(ledger);
    let settings = web::Data::new(PagingSettings {
        default_page_size: config.default_page_size,
        max_page_size: config.max_page_size,
    });

    let bind_addr = (config.http_host.clone(), config.http_port);
    tracing::info!("HTTP server listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(ledger.clone())
            .app_data(settings.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    pool.close().await;
    tracing::info!("Punishment History Service stopped");

    Ok(())
}
