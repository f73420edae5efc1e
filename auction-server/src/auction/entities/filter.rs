use {
    super::{
        Auction,
        AuctionStatus,
        ProductCondition,
    },
    time::OffsetDateTime,
};

/// Criteria for listing auctions. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuctionFilter {
    pub status:         Option<AuctionStatus>,
    pub category:       Option<String>,
    pub condition:      Option<ProductCondition>,
    /// Case-insensitive substring of the product name
    pub product_name:   Option<String>,
    /// Only auctions created strictly before this instant
    pub created_before: Option<OffsetDateTime>,
}

impl AuctionFilter {
    pub fn with_status(status: AuctionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, auction: &Auction) -> bool {
        if let Some(status) = self.status {
            if auction.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &auction.category != category {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if auction.condition != condition {
                return false;
            }
        }
        if let Some(product_name) = &self.product_name {
            if !auction
                .product_name
                .to_lowercase()
                .contains(&product_name.to_lowercase())
            {
                return false;
            }
        }
        if let Some(created_before) = self.created_before {
            if auction.creation_time >= created_before {
                return false;
            }
        }
        true
    }
}
