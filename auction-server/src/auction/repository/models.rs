#[cfg(test)]
use mockall::automock;
use {
    super::{
        entities,
        escape_like_pattern,
        AuctionResult,
        AUCTION_PAGE_SIZE_CAP,
    },
    crate::kernel::db::DB,
    axum::async_trait,
    sqlx::{
        prelude::FromRow,
        QueryBuilder,
    },
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
    tracing::instrument,
    uuid::Uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type)]
#[sqlx(type_name = "auction_status", rename_all = "lowercase")]
pub enum AuctionStatus {
    Active,
    Completed,
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Active => AuctionStatus::Active,
            entities::AuctionStatus::Completed => AuctionStatus::Completed,
        }
    }
}

impl From<AuctionStatus> for entities::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Active => entities::AuctionStatus::Active,
            AuctionStatus::Completed => entities::AuctionStatus::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type)]
#[sqlx(type_name = "product_condition", rename_all = "lowercase")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl From<entities::ProductCondition> for ProductCondition {
    fn from(condition: entities::ProductCondition) -> Self {
        match condition {
            entities::ProductCondition::New => ProductCondition::New,
            entities::ProductCondition::Used => ProductCondition::Used,
            entities::ProductCondition::Refurbished => ProductCondition::Refurbished,
        }
    }
}

impl From<ProductCondition> for entities::ProductCondition {
    fn from(condition: ProductCondition) -> Self {
        match condition {
            ProductCondition::New => entities::ProductCondition::New,
            ProductCondition::Used => entities::ProductCondition::Used,
            ProductCondition::Refurbished => entities::ProductCondition::Refurbished,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Auction {
    pub id:              Uuid,
    pub product_name:    String,
    pub category:        String,
    pub description:     String,
    pub condition:       ProductCondition,
    pub status:          AuctionStatus,
    pub creation_time:   PrimitiveDateTime,
    pub completion_time: Option<PrimitiveDateTime>,
}

impl From<Auction> for entities::Auction {
    fn from(auction: Auction) -> Self {
        Self {
            id:              auction.id,
            product_name:    auction.product_name,
            category:        auction.category,
            description:     auction.description,
            condition:       auction.condition.into(),
            status:          auction.status.into(),
            creation_time:   auction.creation_time.assume_utc(),
            completion_time: auction.completion_time.map(|time| time.assume_utc()),
        }
    }
}

// Timestamps are stored without time zone, always in UTC.
fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(time.date(), time.time())
}

/// Persistence boundary for auctions.
///
/// `update_auction_status` is conditional: it only moves an auction that is
/// currently Active to a different status, so repeated or racing closes are
/// harmless. It returns whether a record was modified.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &entities::Auction) -> AuctionResult<()>;
    async fn get_auction_by_id(
        &self,
        auction_id: entities::AuctionId,
    ) -> AuctionResult<entities::Auction>;
    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> AuctionResult<bool>;
    async fn get_auctions(
        &self,
        filter: entities::AuctionFilter,
    ) -> AuctionResult<Vec<entities::Auction>>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_auction(&self, auction: &entities::Auction) -> AuctionResult<()> {
        sqlx::query(
            "INSERT INTO auction (id,
                                  product_name,
                                  category,
                                  description,
                                  condition,
                                  status,
                                  creation_time) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(auction.id)
        .bind(&auction.product_name)
        .bind(&auction.category)
        .bind(&auction.description)
        .bind(ProductCondition::from(auction.condition))
        .bind(AuctionStatus::from(auction.status))
        .bind(to_primitive(auction.creation_time))
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(auction_id = %auction.id, error = %e, "DB: Failed to insert auction");
            let is_duplicate = e
                .as_database_error()
                .map(|db_error| db_error.is_unique_violation())
                .unwrap_or(false);
            if is_duplicate {
                entities::AuctionError::Store(format!("auction {} already exists", auction.id))
            } else {
                entities::AuctionError::Store(e.to_string())
            }
        })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_auction_by_id",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auction_by_id",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auction_by_id(
        &self,
        auction_id: entities::AuctionId,
    ) -> AuctionResult<entities::Auction> {
        let auction: Option<Auction> = sqlx::query_as("SELECT * FROM auction WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(self)
            .await
            .map_err(|e| {
                tracing::Span::current().record("result", "error");
                tracing::error!(auction_id = %auction_id, error = %e, "DB: Failed to fetch auction");
                entities::AuctionError::Store(e.to_string())
            })?;
        auction
            .map(entities::Auction::from)
            .ok_or(entities::AuctionError::AuctionNotFound)
    }

    #[instrument(
        target = "metrics",
        name = "db_update_auction_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_auction_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> AuctionResult<bool> {
        let completion_time = status
            .is_terminal()
            .then(|| to_primitive(OffsetDateTime::now_utc()));
        let updated = sqlx::query(
            "UPDATE auction SET status = $1, completion_time = COALESCE($2, completion_time) WHERE id = $3 AND status = $4 AND status <> $1",
        )
        .bind(AuctionStatus::from(status))
        .bind(completion_time)
        .bind(auction_id)
        .bind(AuctionStatus::Active)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(auction_id = %auction_id, error = %e, "DB: Failed to update auction status");
            entities::AuctionError::Store(e.to_string())
        })?;
        Ok(updated.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_get_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auctions(
        &self,
        filter: entities::AuctionFilter,
    ) -> AuctionResult<Vec<entities::Auction>> {
        let mut query = QueryBuilder::new("SELECT * FROM auction WHERE TRUE");
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(AuctionStatus::from(status));
        }
        if let Some(category) = filter.category.clone() {
            query.push(" AND category = ");
            query.push_bind(category);
        }
        if let Some(condition) = filter.condition {
            query.push(" AND condition = ");
            query.push_bind(ProductCondition::from(condition));
        }
        if let Some(product_name) = filter.product_name.as_deref() {
            query.push(" AND product_name ILIKE ");
            query.push_bind(format!("%{}%", escape_like_pattern(product_name)));
        }
        if let Some(created_before) = filter.created_before {
            query.push(" AND creation_time < ");
            query.push_bind(to_primitive(created_before));
        }
        query.push(" ORDER BY creation_time ASC LIMIT ");
        query.push_bind(AUCTION_PAGE_SIZE_CAP as i64);

        let auctions: Vec<Auction> = query.build_query_as().fetch_all(self).await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(
                "DB: Failed to fetch auctions: {} - filter: {:?}",
                e,
                filter,
            );
            entities::AuctionError::Store(e.to_string())
        })?;
        Ok(auctions.into_iter().map(entities::Auction::from).collect())
    }
}
