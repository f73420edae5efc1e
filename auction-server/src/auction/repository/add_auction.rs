use {
    super::{
        AuctionResult,
        Repository,
    },
    crate::auction::entities,
};

impl Repository {
    pub async fn add_auction(&self, auction: entities::Auction) -> AuctionResult<entities::Auction> {
        self.db.add_auction(&auction).await?;
        Ok(auction)
    }
}
