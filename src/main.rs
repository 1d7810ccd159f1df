use anyhow::Context;
use tradetally::exchange::BybitClient;
use tradetally::orchestration::{Reporter, Syncer};
use tradetally::{Commands, Config, MarketData, Repository};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("configuration error")?;

    let pool = tradetally::init_db(&config.database_path)
        .await
        .context("failed to initialize database")?;
    let repo = Arc::new(Repository::new(pool));

    let market: Arc<dyn MarketData> = Arc::new(BybitClient::new(
        config.api_url.clone(),
        config.credentials.clone(),
    ));

    let syncer = Syncer::new(
        market.clone(),
        repo.clone(),
        config.categories.clone(),
        config.fetch_limit,
        config.oversell_policy,
    );
    let reporter = Reporter::new(market, repo);
    let commands = Commands::new(syncer, reporter);

    tracing::info!("ready; commands: sync | assets | quit");

    // Minimal line-oriented front end. The real chat transport is an
    // external collaborator that relays the same text.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        let reply = match line.trim() {
            "" => continue,
            "sync" => commands.sync().await,
            "assets" => commands.list_assets().await,
            "quit" | "exit" => break,
            other => format!("unknown command: {}", other),
        };
        stdout
            .write_all(format!("{}\n", reply).as_bytes())
            .await
            .context("stdout write failed")?;
        stdout.flush().await.context("stdout flush failed")?;
    }

    tracing::info!("shutting down");
    Ok(())
}
