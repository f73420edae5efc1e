use {
    super::{
        AuctionResult,
        Repository,
    },
    crate::auction::entities,
};

impl Repository {
    pub async fn get_auctions(
        &self,
        filter: entities::AuctionFilter,
    ) -> AuctionResult<Vec<entities::Auction>> {
        let mut auctions = self.db.get_auctions(filter).await?;
        auctions.truncate(super::AUCTION_PAGE_SIZE_CAP);
        Ok(auctions)
    }
}
