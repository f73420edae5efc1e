use {
    super::{
        AuctionResult,
        Repository,
    },
    crate::auction::entities,
};

impl Repository {
    pub async fn get_auction_by_id(
        &self,
        auction_id: entities::AuctionId,
    ) -> AuctionResult<entities::Auction> {
        self.db.get_auction_by_id(auction_id).await
    }
}
