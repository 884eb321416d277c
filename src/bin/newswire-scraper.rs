//! Scraper process: periodically scrapes the news site and publishes to Kafka

use anyhow::Context;
use clap::Parser;
use newswire::producer::{KafkaPublisher, ProducerConfig};
use newswire::scraper::{FetcherConfig, ScrapeDriver, VnExpressSource};
use newswire::shutdown::{wait_for_signal, Shutdown};
use newswire::telemetry::{init_tracing, LogFormat};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "newswire-scraper")]
#[command(about = "Scrapes news articles and publishes them to Kafka", version)]
struct Args {
    /// Kafka bootstrap servers
    #[arg(long, env = "KAFKA_BROKER", default_value = "kafka:9092")]
    kafka_broker: String,

    /// Topic to publish articles to
    #[arg(long, env = "KAFKA_TOPIC", default_value = "news-updates")]
    kafka_topic: String,

    /// Seconds between scrape ticks
    #[arg(
        long,
        env = "SCRAPE_INTERVAL_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    scrape_interval_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(
        long,
        env = "SCRAPE_HTTP_TIMEOUT_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    scrape_http_timeout_secs: u64,

    /// Upper bound on one whole tick in seconds
    #[arg(
        long,
        env = "SCRAPE_TICK_TIMEOUT_SECS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    scrape_tick_timeout_secs: u64,

    /// Log output format: text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    info!("Starting newswire scraper v{}", newswire::VERSION);

    let publisher = KafkaPublisher::new(ProducerConfig::new(args.kafka_broker, args.kafka_topic))
        .context("failed to create Kafka producer")?;

    let source = VnExpressSource::new(FetcherConfig {
        request_timeout: Duration::from_secs(args.scrape_http_timeout_secs),
        ..Default::default()
    })
    .context("failed to create article fetcher")?;

    let driver = ScrapeDriver::new(source, publisher)
        .with_tick_timeout(Duration::from_secs(args.scrape_tick_timeout_secs));

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    driver
        .start(Duration::from_secs(args.scrape_interval_secs), shutdown)
        .await;

    driver
        .into_publisher()
        .close()
        .await
        .context("failed to flush Kafka producer")?;

    info!("Shutdown complete");
    Ok(())
}
