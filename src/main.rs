//! Heatwatch - heat-stress work/rest cycle tracker
//!
//! Wires configuration, logging and storage, re-arms persisted deadlines,
//! then runs the deadline driver and the idle-conduct sweep until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heatwatch::adapters::memory::{InMemoryConductRegistry, InMemoryCycleStore};
use heatwatch::adapters::postgres::{self, PostgresConductRegistry, PostgresCycleStore};
use heatwatch::adapters::{LoggingEventPublisher, SystemClock};
use heatwatch::application::{
    CycleCoordinator, CycleScheduler, CycleStores, DeactivateIdleConductsHandler,
    SchedulerDriver,
};
use heatwatch::config::{AppConfig, ServerConfig};
use heatwatch::domain::cycle::CycleMachine;
use heatwatch::ports::{Clock, ConductRegistry};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Storage chosen from configuration.
struct Storage {
    stores: CycleStores,
    registry: Arc<dyn ConductRegistry>,
}

async fn build_storage(config: &AppConfig) -> Result<Storage, Box<dyn std::error::Error>> {
    let Some(database) = &config.database else {
        warn!("No database configured; state is kept in memory and lost on exit");
        return Ok(Storage {
            stores: CycleStores::shared(Arc::new(InMemoryCycleStore::new())),
            registry: Arc::new(InMemoryConductRegistry::new()),
        });
    };

    let pool = postgres::connect(database).await?;
    info!(
        max_connections = database.max_connections,
        migrations = database.run_migrations,
        "Database connected"
    );

    Ok(Storage {
        stores: CycleStores::shared(Arc::new(PostgresCycleStore::new(pool.clone()))),
        registry: Arc::new(PostgresConductRegistry::new(pool)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let zones = match config.cycle.zone_table() {
        Ok(zones) => Arc::new(zones),
        Err(e) => {
            error!("Zone table error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        environment = ?config.server.environment,
        zones = zones.len(),
        rest_start = ?config.cycle.rest_start,
        "Starting heatwatch"
    );

    let storage = build_storage(&config).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler = Arc::new(CycleScheduler::new());
    let coordinator = Arc::new(CycleCoordinator::new(
        CycleMachine::new(zones, config.cycle.rest_start),
        storage.stores.clone(),
        storage.registry.clone(),
        Arc::new(LoggingEventPublisher::new()),
        scheduler,
        clock.clone(),
    ));

    coordinator.rehydrate().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let driver = SchedulerDriver::new(
        coordinator.clone(),
        clock.clone(),
        config.scheduler.idle_wait(),
    );
    let driver_shutdown = shutdown_rx.clone();
    let driver_task = tokio::spawn(async move { driver.run(driver_shutdown).await });

    let sweeper = DeactivateIdleConductsHandler::new(
        storage.registry.clone(),
        storage.stores.audit.clone(),
        clock,
        config.conduct.inactivity_hours,
    );
    let sweep_every = config.conduct.sweep_interval();
    let sweeper_task = tokio::spawn(async move { sweeper.run(sweep_every, shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    shutdown_tx.send(true)?;

    for task in [driver_task, sweeper_task] {
        if let Err(e) = task.await {
            error!("Background task failed: {}", e);
        }
    }

    info!("Heatwatch stopped");
    Ok(())
}
