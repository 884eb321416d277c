//! API process: consumes the article topic and serves the latest window
//!
//! Shutdown order on SIGINT/SIGTERM: stop the consumer loop, close the Kafka
//! consumer, then let the HTTP server drain for a bounded grace period. The
//! server keeps its own handle so it serves until the consumer is closed.

use anyhow::{anyhow, Context};
use clap::Parser;
use newswire::consumer::{ArticleConsumer, ConsumerConfig, KafkaMessageStream};
use newswire::ratelimit::{ClientIpPolicy, RateLimitConfig, RateLimiter};
use newswire::service::{ApiServer, ApiService, ServerConfig};
use newswire::shutdown::{drain, wait_for_signal, Shutdown};
use newswire::store::WindowStore;
use newswire::telemetry::{init_tracing, LogFormat};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const CONSUMER_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "newswire-api")]
#[command(about = "Serves the latest scraped articles over HTTP", version)]
struct Args {
    /// HTTP listen port
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    port: u16,

    /// Kafka bootstrap servers
    #[arg(long, env = "KAFKA_BROKER", default_value = "kafka:9092")]
    kafka_broker: String,

    /// Topic to consume articles from
    #[arg(long, env = "KAFKA_TOPIC", default_value = "news-updates")]
    kafka_topic: String,

    /// Consumer group
    #[arg(long, env = "KAFKA_GROUP_ID", default_value = "news-aggregator-group")]
    kafka_group_id: String,

    /// Number of articles kept in the latest window
    #[arg(
        long,
        env = "WINDOW_CAPACITY",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    window_capacity: u64,

    /// Steady-state requests per second per client
    #[arg(long, env = "RATE_LIMIT_RPS", default_value_t = 5.0)]
    rate_limit_rps: f64,

    /// Burst allowance per client
    #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = 10)]
    rate_limit_burst: u32,

    /// Seconds of inactivity before a client's bucket is dropped
    #[arg(long, env = "RATE_LIMIT_IDLE_TTL_SECS", default_value_t = 300)]
    rate_limit_idle_ttl_secs: u64,

    /// Seconds between idle-client sweeps
    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value_t = 60)]
    rate_limit_sweep_secs: u64,

    /// How X-Forwarded-For is used to identify clients: none, proxy or all
    #[arg(long, env = "TRUST_FORWARDED_FOR", default_value = "none")]
    trust_forwarded_for: ClientIpPolicy,

    /// Log output format: text or json
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format)?;

    info!("Starting newswire API v{}", newswire::VERSION);

    let rate_limit = RateLimitConfig {
        rps: args.rate_limit_rps,
        burst: args.rate_limit_burst,
        idle_ttl: Duration::from_secs(args.rate_limit_idle_ttl_secs),
        sweep_interval: Duration::from_secs(args.rate_limit_sweep_secs),
        client_ip: args.trust_forwarded_for,
    };
    rate_limit
        .validate()
        .map_err(|e| anyhow!("invalid rate limit settings: {}", e))?;

    let consumer_config = ConsumerConfig::builder()
        .brokers(args.kafka_broker)
        .group_id(args.kafka_group_id)
        .topic(args.kafka_topic)
        .build();

    let server_config = ServerConfig::with_port(args.port);

    let shutdown = Shutdown::new();
    let server_shutdown = Shutdown::new();
    let store = Arc::new(WindowStore::new(args.window_capacity as usize));
    let limiter = Arc::new(RateLimiter::new(rate_limit));

    let server = ApiServer::bind(&server_config, ApiService::new(store.clone(), limiter.clone()))
        .await
        .context("failed to start HTTP server")?;

    let stream = KafkaMessageStream::connect(&consumer_config)
        .await
        .context("failed to create Kafka consumer")?;
    let mut consumer = ArticleConsumer::new(stream, store, consumer_config.fetch_error_backoff);

    let sweeper = limiter.spawn_sweeper(shutdown.clone());
    let signal_task = tokio::spawn(wait_for_signal(shutdown.clone()));
    let consumer_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            consumer.run(&shutdown).await;
            consumer
        })
    };
    let mut server_task = tokio::spawn(server.run(server_shutdown.clone()));

    // Either a signal arrives or the server dies on its own
    let early_exit = tokio::select! {
        _ = shutdown.triggered() => None,
        joined = &mut server_task => Some(joined),
    };
    shutdown.trigger();
    signal_task.abort();

    if let Some(consumer) = drain("Consumer", consumer_task, CONSUMER_GRACE).await {
        let totals = consumer.metrics().snapshot();
        consumer.close().await;
        info!(
            "Consumer closed after {} messages ({} stored, {} poison)",
            totals.consumed, totals.stored, totals.poison
        );
    }
    drain("Rate-limit sweeper", sweeper, CONSUMER_GRACE).await;
    server_shutdown.trigger();

    let server_result = match early_exit {
        Some(Ok(result)) => result,
        Some(Err(e)) => return Err(anyhow!("API server task panicked: {}", e)),
        None => match drain("API server", server_task, server_config.shutdown_grace).await {
            Some(result) => result,
            None => Ok(()),
        },
    };

    server_result.context("API server failed")?;

    info!("Shutdown complete");
    Ok(())
}
