use {
    super::Service,
    crate::{
        auction::entities,
        per_metrics::AUCTION_CREATED_TOTAL,
    },
    axum_prometheus::metrics,
};

pub struct AddAuctionInput {
    pub auction: entities::AuctionCreate,
}

impl Service {
    /// Validates and persists a new auction, then schedules its automatic close.
    ///
    /// Returns as soon as the Active record is stored; the close happens in the
    /// background once the configured interval has elapsed.
    pub async fn add_auction(
        &self,
        input: AddAuctionInput,
    ) -> Result<entities::Auction, entities::AuctionError> {
        let auction = entities::Auction::try_new(input.auction).inspect_err(|e| {
            tracing::info!(error = %e, "Rejected auction");
        })?;
        let auction = self.repo.add_auction(auction).await.inspect_err(|e| {
            tracing::error!(error = ?e, "Failed to add auction");
        })?;
        tracing::info!(
            auction_id = %auction.id,
            product_name = auction.product_name,
            condition = %auction.condition,
            "Auction created"
        );
        metrics::counter!(AUCTION_CREATED_TOTAL).increment(1);

        self.schedule_auto_close(auction.clone());
        Ok(auction)
    }
}
