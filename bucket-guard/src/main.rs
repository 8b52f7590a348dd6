use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use bucket_guard::clients::{self, AlertPublisher, PostureStore, S3PostureStore, SnsPublisher};
use bucket_guard::mock::{InMemoryPostureStore, RecordingPublisher};
use bucket_guard::{Dispatcher, GuardConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bucket-guard: lock down S3 buckets created without public access protection"
)]
struct Cli {
    /// Event JSON file (reads stdin when omitted)
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Use in-memory S3/SNS stand-ins instead of AWS
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Override SNS_TOPIC_ARN
    #[arg(long)]
    topic_arn: Option<String>,

    /// Override GUARD_SETTLE_DELAY_MS
    #[arg(long)]
    settle_delay_ms: Option<u64>,

    /// AWS region (defaults to the SDK provider chain)
    #[arg(long)]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = GuardConfig::from_env()?;
    if let Some(arn) = cli.topic_arn {
        config.topic_arn = arn;
    }
    if let Some(ms) = cli.settle_delay_ms {
        config.settle_delay = Duration::from_millis(ms);
    }
    config.warn_if_placeholder();

    let event = read_event(cli.event.as_ref())?;

    let (store, publisher): (Arc<dyn PostureStore>, Arc<dyn AlertPublisher>) = if cli.mock {
        info!("running against in-memory stand-ins");
        (Arc::new(InMemoryPostureStore::demo()), Arc::new(RecordingPublisher::new()))
    } else {
        let conf = clients::load_sdk_config(config.max_attempts, cli.region).await;
        (Arc::new(S3PostureStore::new(&conf)), Arc::new(SnsPublisher::new(&conf)))
    };

    let dispatcher = Dispatcher::new(store, publisher, &config);
    let result = dispatcher.handle(&event).await;

    println!("{}", serde_json::to_string(&result)?);
    Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn read_event(path: Option<&PathBuf>) -> Result<serde_json::Value> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("read event file {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}
