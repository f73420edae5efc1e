use {
    anyhow::Result,
    auction_lifecycle_server::{
        config,
        per_metrics::{
            is_metrics,
            MetricsLayer,
        },
        server::start_server,
    },
    clap::Parser,
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            self,
            LevelFilter,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
        Layer,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize a Tracing Subscriber
    let log_layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    let log_layer = if std::io::stderr().is_terminal() {
        log_layer.compact().boxed()
    } else {
        log_layer.json().boxed()
    };

    tracing_subscriber::registry()
        .with(MetricsLayer.with_filter(filter::filter_fn(is_metrics)))
        .with(
            log_layer.with_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            ),
        )
        .try_init()?;

    // Parse the command line arguments with clap, will exit automatically on `--help` or
    // with invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
    }
}
