use {
    crate::{
        auction::{
            repository::InMemoryDatabase,
            service::{
                self,
                Service,
            },
        },
        config::RunOptions,
        kernel::db::DB,
        metrics_api::start_metrics,
        per_metrics::{
            AUCTION_CLOSE_DELAY_BUCKETS,
            AUCTION_CLOSE_DELAY_METRIC,
        },
        state::ServerState,
    },
    anyhow::anyhow,
    axum_prometheus::metrics_exporter_prometheus::{
        Matcher,
        PrometheusBuilder,
    },
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

/// How long pending auto-close tasks may keep running after shutdown was requested.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

async fn build_service(run_options: &RunOptions, task_tracker: TaskTracker) -> anyhow::Result<Service> {
    let config = service::Config::from(run_options.auction.clone());
    tracing::info!(
        auction_interval = ?config.auction_interval,
        close_timeout = ?config.close_timeout,
        reconciliation_interval = ?config.reconciliation_interval,
        "Auction configuration loaded"
    );

    match &run_options.server.database_url {
        Some(database_url) => {
            let pool: DB = PgPoolOptions::new()
                .max_connections(run_options.server.database_max_connections)
                .connect(database_url)
                .await
                .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
            Ok(Service::new(pool, config, task_tracker))
        }
        None => {
            tracing::warn!("No database url configured, auctions will not survive a restart");
            Ok(Service::new(InMemoryDatabase::default(), config, task_tracker))
        }
    }
}

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for the shutdown signal");
        }
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let metrics_recorder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(AUCTION_CLOSE_DELAY_METRIC.to_string()),
            AUCTION_CLOSE_DELAY_BUCKETS,
        )?
        .install_recorder()?;

    let task_tracker = TaskTracker::new();
    let server_state = Arc::new(ServerState {
        metrics_recorder,
        auction_service: build_service(&run_options, task_tracker.clone()).await?,
    });

    let reconciliation_loop = tokio::spawn({
        let server_state = server_state.clone();
        async move {
            server_state
                .auction_service
                .run_reconciliation_loop()
                .await
        }
    });
    let metrics_loop = tokio::spawn(start_metrics(run_options, server_state.clone()));

    for result in join_all(vec![reconciliation_loop, metrics_loop]).await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(error = ?err, "Server task failed"),
            Err(err) => tracing::error!(error = ?err, "Server task panicked"),
        }
    }

    // Timers still pending at this point are picked up by the next reconciliation sweep.
    task_tracker.close();
    if tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, task_tracker.wait())
        .await
        .is_err()
    {
        tracing::warn!(
            pending = task_tracker.len(),
            "Exiting with auction close tasks still pending"
        );
    }
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
//
// NOTE: A more idiomatic approach would be to use a tokio::sync::broadcast channel, and to send a
// shutdown signal to all running tasks. However, this is a bit more complicated to implement and
// we don't rely on global state for anything else.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
