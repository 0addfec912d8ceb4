use std::sync::Arc;
use std::time::Duration;

use order_server::core::TaskKind;
use order_server::services::InMemoryCatalog;
use order_server::{BackgroundTasks, Config, NotificationDispatcher, OrdersManager, ScheduledOrderWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, working directory, logging)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    order_server::init_logger_with_file(Some(&config.log_level), Some(&config.work_dir));

    tracing::info!(environment = %config.environment, "Order server starting");

    std::fs::create_dir_all(&config.work_dir)?;

    // 2. Engine. The in-memory catalog is the default collaborator set;
    // deployments wire real adapters here.
    let catalog = Arc::new(InMemoryCatalog::new());
    let manager = Arc::new(OrdersManager::new(
        config.db_path(),
        catalog,
        config.timezone(),
    )?);
    tracing::info!(epoch = %manager.epoch(), "Orders manager ready");

    // 3. Background tasks: notification fan-out + scheduled-order worker
    let dispatcher = Arc::new(NotificationDispatcher::new());
    let mut tasks = BackgroundTasks::new();

    let fanout_dispatcher = dispatcher.clone();
    let fanout_source = manager.subscribe();
    tasks.spawn("notification_fanout", TaskKind::Listener, async move {
        order_server::message::run_event_fanout(fanout_dispatcher, fanout_source).await;
    });

    let worker = ScheduledOrderWorker::new(
        manager.clone(),
        Duration::from_secs(config.scheduler_interval_secs),
        tasks.shutdown_token(),
    );
    tasks.spawn("scheduled_orders", TaskKind::Periodic, worker.run());

    // 4. Run until interrupted
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    tasks.shutdown().await;

    Ok(())
}
