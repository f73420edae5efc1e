use {
    crate::auction::service,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::time::Duration,
};

mod server;

// `Options` is a structup definition to provide clean command-line args for the auction server.
#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction lifecycle service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub auction: AuctionOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Auction Options")]
#[group(id = "Auction")]
pub struct AuctionOptions {
    /// How long an auction stays active before it is closed, e.g. "20s", "5m", "200ms".
    /// At most 365 days.
    #[arg(long = "auction-interval")]
    #[arg(env = "AUCTION_INTERVAL")]
    #[arg(default_value = "5m")]
    #[arg(value_parser = parse_duration)]
    pub auction_interval: Duration,

    /// Upper bound on a single close write against the store.
    #[arg(long = "close-timeout")]
    #[arg(env = "AUCTION_CLOSE_TIMEOUT")]
    #[arg(default_value = "5s")]
    #[arg(value_parser = parse_duration)]
    pub close_timeout: Duration,

    /// How often to sweep for active auctions whose deadline already passed.
    #[arg(long = "reconciliation-interval")]
    #[arg(env = "AUCTION_RECONCILIATION_INTERVAL")]
    #[arg(default_value = "30s")]
    #[arg(value_parser = parse_duration)]
    pub reconciliation_interval: Duration,
}

impl From<AuctionOptions> for service::Config {
    fn from(options: AuctionOptions) -> Self {
        service::Config {
            auction_interval:        options.auction_interval,
            close_timeout:           options.close_timeout,
            reconciliation_interval: options.reconciliation_interval,
        }
    }
}

/// Upper bound for every configured duration.
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn parse_duration(value: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(value.trim()).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    if duration > MAX_DURATION {
        return Err(format!(
            "duration must not exceed {}",
            humantime::format_duration(MAX_DURATION)
        ));
    }
    Ok(duration)
}
