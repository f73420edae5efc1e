use {
    super::{
        AuctionResult,
        Repository,
    },
    crate::auction::entities,
};

impl Repository {
    /// Returns false when nothing was modified, i.e. the auction was missing or
    /// no longer in a state the new status can be reached from.
    pub async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> AuctionResult<bool> {
        self.db.update_auction_status(auction_id, status).await
    }
}
