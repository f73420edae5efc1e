use {
    super::Service,
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    anyhow::Result,
    std::sync::atomic::Ordering,
};

impl Service {
    /// Periodically closes auctions whose timer never fired.
    ///
    /// The first sweep runs right away, which picks up auctions left Active by a
    /// previous process.
    pub async fn run_reconciliation_loop(&self) -> Result<()> {
        tracing::info!(
            interval = ?self.config.reconciliation_interval,
            "Starting auction reconciliation..."
        );
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);
        let mut reconciliation_interval =
            tokio::time::interval(self.config.reconciliation_interval);
        reconciliation_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = reconciliation_interval.tick() => {
                    match self.close_expired_auctions().await {
                        Ok(0) => {}
                        Ok(closed) => tracing::info!(closed, "Reconciled expired auctions"),
                        Err(e) => tracing::error!(error = ?e, "Failed to reconcile expired auctions"),
                    }
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down auction reconciliation...");
        Ok(())
    }
}
