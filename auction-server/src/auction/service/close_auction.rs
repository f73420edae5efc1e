use {
    super::Service,
    crate::{
        auction::entities,
        per_metrics::{
            AUCTION_CLOSE_DELAY_METRIC,
            AUCTION_CLOSE_TOTAL,
        },
    },
    axum_prometheus::metrics,
    time::OffsetDateTime,
};

pub struct CloseAuctionInput {
    pub auction_id: entities::AuctionId,
}

/// What a close attempt did to the stored auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// Already completed or missing, nothing was modified
    Noop,
    Failed,
}

impl CloseOutcome {
    fn as_label(&self) -> &'static str {
        match self {
            CloseOutcome::Closed => "success",
            CloseOutcome::Noop => "noop",
            CloseOutcome::Failed => "error",
        }
    }
}

impl Service {
    /// Moves an Active auction to Completed.
    ///
    /// The store write is conditional, so closing an auction that is already
    /// completed (or unknown) returns `Ok(false)` and changes nothing.
    pub async fn close_auction(
        &self,
        input: CloseAuctionInput,
    ) -> Result<bool, entities::AuctionError> {
        let timeout = self.config.close_timeout;
        tokio::time::timeout(
            timeout,
            self.repo
                .update_auction_status(input.auction_id, entities::AuctionStatus::Completed),
        )
        .await
        .map_err(|_| {
            entities::AuctionError::Store(format!("closing auction timed out after {:?}", timeout))
        })?
    }

    pub(super) fn schedule_auto_close(&self, auction: entities::Auction) {
        self.task_tracker.spawn({
            let service = self.clone();
            async move {
                service.run_auto_close(auction).await;
            }
        });
    }

    #[tracing::instrument(skip_all, fields(auction_id = %auction.id, state = tracing::field::Empty))]
    async fn run_auto_close(&self, auction: entities::Auction) -> CloseOutcome {
        let interval = self.config.auction_interval;
        let deadline = auction.deadline(interval);
        record_state(entities::AutoCloseState::Scheduled);
        tracing::debug!(deadline = %deadline, "Auction close scheduled");

        tokio::time::sleep(auction.time_until_deadline(interval, OffsetDateTime::now_utc())).await;

        record_state(entities::AutoCloseState::Fired);
        let result = self
            .close_auction(CloseAuctionInput {
                auction_id: auction.id,
            })
            .await;
        record_state(entities::AutoCloseState::Acknowledged);

        let outcome = self.observe_close_result(auction.id, result);
        if outcome != CloseOutcome::Failed {
            let delay = OffsetDateTime::now_utc() - deadline;
            metrics::histogram!(AUCTION_CLOSE_DELAY_METRIC).record(delay.as_seconds_f64());
        }
        outcome
    }

    /// Logs and counts a close attempt. Failures end here: there is no caller
    /// waiting for a background close.
    pub(super) fn observe_close_result(
        &self,
        auction_id: entities::AuctionId,
        result: Result<bool, entities::AuctionError>,
    ) -> CloseOutcome {
        let outcome = match result {
            Ok(true) => {
                tracing::info!(auction_id = %auction_id, "Auction completed");
                CloseOutcome::Closed
            }
            Ok(false) => {
                tracing::debug!(
                    auction_id = %auction_id,
                    "Auction was already completed or no longer exists"
                );
                CloseOutcome::Noop
            }
            Err(e) => {
                tracing::error!(auction_id = %auction_id, error = ?e, "Failed to close auction");
                CloseOutcome::Failed
            }
        };
        metrics::counter!(AUCTION_CLOSE_TOTAL, &[("result", outcome.as_label())]).increment(1);
        outcome
    }
}

fn record_state(state: entities::AutoCloseState) {
    tracing::Span::current().record("state", state.as_ref());
}
