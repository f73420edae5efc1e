use {
    super::repository::{
        Database,
        Repository,
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub mod add_auction;
pub mod close_auction;
pub mod close_expired_auctions;
pub mod get_auction_by_id;
pub mod get_auctions;
pub mod workers;

#[derive(Clone, Debug)]
pub struct Config {
    /// Time an auction stays active before it is closed automatically.
    pub auction_interval:        Duration,
    /// Upper bound for a single close write.
    pub close_timeout:           Duration,
    /// Period of the sweep that closes auctions whose timer was lost.
    pub reconciliation_interval: Duration,
}

pub struct ServiceInner {
    config:       Config,
    repo:         Arc<Repository>,
    task_tracker: TaskTracker,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: impl Database, config: Config, task_tracker: TaskTracker) -> Self {
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new(db)),
            task_tracker,
        }))
    }
}
