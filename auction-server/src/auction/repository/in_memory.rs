use {
    super::{
        entities,
        AuctionResult,
        Database,
        AUCTION_PAGE_SIZE_CAP,
    },
    axum::async_trait,
    std::collections::HashMap,
    time::OffsetDateTime,
    tokio::sync::RwLock,
};

/// Process-local auction store with the same contract as the Postgres one.
///
/// Records are lost on restart, so this is only meant for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    auctions: RwLock<HashMap<entities::AuctionId, entities::Auction>>,
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn add_auction(&self, auction: &entities::Auction) -> AuctionResult<()> {
        let mut auctions = self.auctions.write().await;
        if auctions.contains_key(&auction.id) {
            return Err(entities::AuctionError::Store(format!(
                "auction {} already exists",
                auction.id
            )));
        }
        auctions.insert(auction.id, auction.clone());
        Ok(())
    }

    async fn get_auction_by_id(
        &self,
        auction_id: entities::AuctionId,
    ) -> AuctionResult<entities::Auction> {
        self.auctions
            .read()
            .await
            .get(&auction_id)
            .cloned()
            .ok_or(entities::AuctionError::AuctionNotFound)
    }

    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> AuctionResult<bool> {
        let mut auctions = self.auctions.write().await;
        match auctions.get_mut(&auction_id) {
            Some(auction) if auction.status.can_transition_to(status) => {
                auction.status = status;
                if status.is_terminal() {
                    auction.completion_time = Some(OffsetDateTime::now_utc());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_auctions(
        &self,
        filter: entities::AuctionFilter,
    ) -> AuctionResult<Vec<entities::Auction>> {
        let mut auctions: Vec<entities::Auction> = self
            .auctions
            .read()
            .await
            .values()
            .filter(|auction| filter.matches(auction))
            .cloned()
            .collect();
        auctions.sort_by_key(|auction| auction.creation_time);
        auctions.truncate(AUCTION_PAGE_SIZE_CAP);
        Ok(auctions)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::entities::AuctionCreate,
        std::sync::Arc,
    };

    fn new_auction(product_name: &str, category: &str) -> entities::Auction {
        entities::Auction::try_new(AuctionCreate {
            product_name: product_name.to_string(),
            category:     category.to_string(),
            description:  "Descrição do produto para teste com mais de dez caracteres".to_string(),
            condition:    "new".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_auction() {
        let db = InMemoryDatabase::default();
        let auction = new_auction("Produto Teste", "Categoria");
        db.add_auction(&auction).await.unwrap();
        assert_eq!(db.get_auction_by_id(auction.id).await.unwrap(), auction);
    }

    #[tokio::test]
    async fn test_add_duplicate_auction_fails() {
        let db = InMemoryDatabase::default();
        let auction = new_auction("Produto Teste", "Categoria");
        db.add_auction(&auction).await.unwrap();
        assert!(matches!(
            db.add_auction(&auction).await,
            Err(entities::AuctionError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_auction() {
        let db = InMemoryDatabase::default();
        assert_eq!(
            db.get_auction_by_id(entities::AuctionId::new_v4()).await,
            Err(entities::AuctionError::AuctionNotFound)
        );
    }

    #[tokio::test]
    async fn test_update_status_is_conditional() {
        let db = InMemoryDatabase::default();
        let auction = new_auction("Produto Teste", "Categoria");
        db.add_auction(&auction).await.unwrap();

        assert!(!db
            .update_auction_status(auction.id, entities::AuctionStatus::Active)
            .await
            .unwrap());
        assert!(db
            .update_auction_status(auction.id, entities::AuctionStatus::Completed)
            .await
            .unwrap());
        let completed = db.get_auction_by_id(auction.id).await.unwrap();
        assert_eq!(completed.status, entities::AuctionStatus::Completed);
        let completion_time = completed.completion_time.unwrap();

        // second close is a no-op and never reverts
        assert!(!db
            .update_auction_status(auction.id, entities::AuctionStatus::Completed)
            .await
            .unwrap());
        assert!(!db
            .update_auction_status(auction.id, entities::AuctionStatus::Active)
            .await
            .unwrap());
        let stored = db.get_auction_by_id(auction.id).await.unwrap();
        assert_eq!(stored.status, entities::AuctionStatus::Completed);
        assert_eq!(stored.completion_time, Some(completion_time));

        assert!(!db
            .update_auction_status(entities::AuctionId::new_v4(), entities::AuctionStatus::Completed)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_closes_apply_once() {
        let db = Arc::new(InMemoryDatabase::default());
        let auction = new_auction("Produto Teste", "Categoria");
        db.add_auction(&auction).await.unwrap();
        let auction_id = auction.id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move {
                    db.update_auction_status(auction_id, entities::AuctionStatus::Completed)
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn test_get_auctions_filters_and_orders_by_creation_time() {
        let db = InMemoryDatabase::default();
        let now = OffsetDateTime::now_utc();
        let mut first = new_auction("Monitor Gamer", "Informática");
        first.creation_time = now - time::Duration::seconds(3);
        let mut second = new_auction("Smartphone Samsung", "Eletrônicos");
        second.creation_time = now - time::Duration::seconds(2);
        let mut third = new_auction("Notebook Dell", "Informática");
        third.creation_time = now - time::Duration::seconds(1);
        for auction in [&third, &first, &second] {
            db.add_auction(auction).await.unwrap();
        }
        db.update_auction_status(second.id, entities::AuctionStatus::Completed)
            .await
            .unwrap();

        let all = db.get_auctions(Default::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, second.id, third.id]
        );

        let active = db
            .get_auctions(entities::AuctionFilter::with_status(
                entities::AuctionStatus::Active,
            ))
            .await
            .unwrap();
        assert_eq!(
            active.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, third.id]
        );

        let by_category = db
            .get_auctions(entities::AuctionFilter {
                category: Some("Eletrônicos".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].id, second.id);
    }
}
