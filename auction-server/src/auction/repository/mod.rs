use {
    super::entities,
    std::fmt::Debug,
};

mod add_auction;
mod get_auction_by_id;
mod get_auctions;
mod in_memory;
mod models;
mod update_auction_status;

pub use {
    in_memory::InMemoryDatabase,
    models::*,
};

pub const AUCTION_PAGE_SIZE_CAP: usize = 100;

pub type AuctionResult<T> = Result<T, entities::AuctionError>;

#[derive(Debug)]
pub struct Repository {
    pub db: Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self { db: Box::new(db) }
    }
}

/// Escapes the LIKE wildcards so user input is matched literally.
fn escape_like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
