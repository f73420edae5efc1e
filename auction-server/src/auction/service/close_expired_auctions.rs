use {
    super::{
        close_auction::{
            CloseAuctionInput,
            CloseOutcome,
        },
        Service,
    },
    crate::auction::{
        entities,
        repository::AUCTION_PAGE_SIZE_CAP,
    },
    futures::future::join_all,
    time::OffsetDateTime,
};

impl Service {
    /// Closes Active auctions whose deadline has already passed.
    ///
    /// Recovers auctions whose in-process timer was lost, e.g. across a restart.
    /// Racing a live timer is harmless because the close is conditional.
    /// Returns the number of auctions this sweep completed.
    #[tracing::instrument(skip_all)]
    pub async fn close_expired_auctions(&self) -> Result<usize, entities::AuctionError> {
        let interval = self.config.auction_interval;
        let mut closed = 0;
        loop {
            let now = OffsetDateTime::now_utc();
            let Some(cutoff) = time::Duration::try_from(interval)
                .ok()
                .and_then(|interval| now.checked_sub(interval))
            else {
                // nothing can have been created that long ago
                break;
            };
            let mut expired = self
                .repo
                .get_auctions(entities::AuctionFilter {
                    status: Some(entities::AuctionStatus::Active),
                    created_before: Some(cutoff),
                    ..Default::default()
                })
                .await?;
            let page_len = expired.len();
            expired.retain(|auction| auction.is_expired(interval, now));
            if expired.is_empty() {
                break;
            }
            tracing::info!(count = expired.len(), "Closing expired auctions");

            let results = join_all(expired.iter().map(|auction| {
                self.close_auction(CloseAuctionInput {
                    auction_id: auction.id,
                })
            }))
            .await;
            let closed_in_page = expired
                .iter()
                .zip(results)
                .filter(|(auction, result)| {
                    self.observe_close_result(auction.id, result.clone()) == CloseOutcome::Closed
                })
                .count();
            closed += closed_in_page;

            // a short page was the last one; a page where nothing moved would repeat forever
            if page_len < AUCTION_PAGE_SIZE_CAP || closed_in_page == 0 {
                break;
            }
        }
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::repository::{
            InMemoryDatabase,
            MockDatabase,
        },
        std::time::Duration,
    };

    fn auction(created_secs_ago: i64) -> entities::Auction {
        let mut auction = entities::Auction::try_new(entities::AuctionCreate {
            product_name: "Produto Teste".to_string(),
            category:     "Categoria".to_string(),
            description:  "Descrição do produto para teste com mais de dez caracteres".to_string(),
            condition:    "new".to_string(),
        })
        .unwrap();
        auction.creation_time -= time::Duration::seconds(created_secs_ago);
        auction
    }

    #[tokio::test]
    async fn test_closes_only_overdue_active_auctions() {
        let service = Service::new_with_mocks(InMemoryDatabase::default(), Duration::from_secs(60));
        let overdue = service.repo.add_auction(auction(120)).await.unwrap();
        let fresh = service.repo.add_auction(auction(10)).await.unwrap();
        let completed = service.repo.add_auction(auction(300)).await.unwrap();
        service
            .repo
            .update_auction_status(completed.id, entities::AuctionStatus::Completed)
            .await
            .unwrap();

        assert_eq!(service.close_expired_auctions().await.unwrap(), 1);
        assert_eq!(
            service.repo.get_auction_by_id(overdue.id).await.unwrap().status,
            entities::AuctionStatus::Completed
        );
        assert_eq!(
            service.repo.get_auction_by_id(fresh.id).await.unwrap().status,
            entities::AuctionStatus::Active
        );

        // a second sweep finds nothing left to do
        assert_eq!(service.close_expired_auctions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweeps_every_page() {
        let service = Service::new_with_mocks(InMemoryDatabase::default(), Duration::from_secs(60));
        let total = AUCTION_PAGE_SIZE_CAP + 5;
        for _ in 0..total {
            service.repo.add_auction(auction(120)).await.unwrap();
        }

        assert_eq!(service.close_expired_auctions().await.unwrap(), total);
        let active = service
            .repo
            .get_auctions(entities::AuctionFilter::with_status(
                entities::AuctionStatus::Active,
            ))
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_stops_when_no_close_succeeds() {
        let mut db = MockDatabase::new();
        db.expect_get_auctions()
            .times(1)
            .returning(|_| Ok((0..AUCTION_PAGE_SIZE_CAP).map(|_| auction(120)).collect()));
        db.expect_update_auction_status()
            .times(AUCTION_PAGE_SIZE_CAP)
            .returning(|_, _| Err(entities::AuctionError::Store("connection reset".to_string())));
        let service = Service::new_with_mocks(db, Duration::from_secs(60));

        assert_eq!(service.close_expired_auctions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_huge_interval_closes_nothing() {
        let service = Service::new_with_mocks(
            InMemoryDatabase::default(),
            Duration::from_secs(631_152_000_000),
        );
        let auction = service.repo.add_auction(auction(120)).await.unwrap();

        assert_eq!(service.close_expired_auctions().await.unwrap(), 0);
        assert_eq!(
            service.repo.get_auction_by_id(auction.id).await.unwrap().status,
            entities::AuctionStatus::Active
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_returned() {
        let mut db = MockDatabase::new();
        db.expect_get_auctions()
            .returning(|_| Err(entities::AuctionError::Store("connection refused".to_string())));
        let service = Service::new_with_mocks(db, Duration::from_secs(60));

        assert!(matches!(
            service.close_expired_auctions().await,
            Err(entities::AuctionError::Store(_))
        ));
    }
}
