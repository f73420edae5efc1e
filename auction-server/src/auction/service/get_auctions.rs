use {
    super::Service,
    crate::auction::entities,
};

pub struct GetAuctionsInput {
    pub filter: entities::AuctionFilter,
}

impl Service {
    pub async fn get_auctions(
        &self,
        input: GetAuctionsInput,
    ) -> Result<Vec<entities::Auction>, entities::AuctionError> {
        self.repo.get_auctions(input.filter).await.inspect_err(|e| {
            tracing::error!(error = ?e, "Failed to list auctions");
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            repository::MockDatabase,
            service::get_auction_by_id::GetAuctionByIdInput,
        },
        std::time::Duration,
    };

    #[tokio::test]
    async fn test_get_auctions_passes_filter_to_store() {
        let mut db = MockDatabase::new();
        db.expect_get_auctions()
            .withf(|filter| {
                filter.category.as_deref() == Some("Informática")
                    && filter.condition == Some(entities::ProductCondition::New)
                    && filter.status.is_none()
            })
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = Service::new_with_mocks(db, Duration::from_secs(60));

        let auctions = service
            .get_auctions(GetAuctionsInput {
                filter: entities::AuctionFilter {
                    category: Some("Informática".to_string()),
                    condition: Some(entities::ProductCondition::New),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert!(auctions.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_auction_by_id() {
        let mut db = MockDatabase::new();
        db.expect_get_auction_by_id()
            .returning(|_| Err(entities::AuctionError::AuctionNotFound));
        let service = Service::new_with_mocks(db, Duration::from_secs(60));

        let result = service
            .get_auction_by_id(GetAuctionByIdInput {
                auction_id: entities::AuctionId::new_v4(),
            })
            .await;
        assert_eq!(result, Err(entities::AuctionError::AuctionNotFound));
    }
}
