use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{stdin, stdout, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use todo_app::{Config, HealthMonitor, Page, QueryCache, ReqwestTransport, Shell, TodoApi, TodoQueries};

#[derive(Parser, Debug)]
#[command(name = "todo-ui", about = "Terminal client for the todo service")]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    /// Render the page once and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load().context("failed to load configuration")?;
    info!(api = %config.todo_api_url, health = %config.todo_health_url, "starting todo-ui");

    let transport = Arc::new(ReqwestTransport::new().context("failed to build HTTP client")?);
    let api = TodoApi::new(&config.todo_api_url, &config.todo_health_url, transport)
        .with_request_timeout(config.request_timeout());
    let cache = Arc::new(QueryCache::new());
    let queries = TodoQueries::new(api.clone(), cache.clone());

    let policy = config.health_policy();
    let monitor = HealthMonitor::spawn(api, cache, policy, CancellationToken::new());
    let mut page = Page::new(queries);

    if args.once {
        let mut health = monitor.subscribe();
        let settle = policy.timeout * (policy.retries + 1) + policy.retry_delay * policy.retries;
        // Show whatever is known if the first check has not settled by then.
        match tokio::time::timeout(settle, health.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => debug!("health monitor stopped before the first check settled"),
            Err(_) => debug!(?settle, "first health check did not settle in time"),
        }
        page.set_health(&monitor.current());
        page.sync().await;
        let mut out = stdout();
        out.write_all(page.render().as_bytes()).await?;
        out.flush().await?;
    } else {
        let mut shell = Shell::new(page, monitor.subscribe());
        shell.run(BufReader::new(stdin()), stdout()).await?;
    }

    monitor.shutdown().await;
    Ok(())
}
