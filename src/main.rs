use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_finder::display::{project, project_trending};
use movie_finder::{Config, PopularityStore, SearchSession, TmdbClient};

const QUIT_COMMAND: &str = ":q";
const TRENDING_COMMAND: &str = ":trending";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let api = Arc::new(TmdbClient::new(config.tmdb.clone())?);
    let store = Arc::new(PopularityStore::from_config(&config.popularity).await);

    let mut session = SearchSession::mount(&config.search, api, store);
    print_trending(&session, config.search.trending_limit).await;

    // Render every state transition
    let mut states = session.subscribe();
    let renderer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let instruction = project(&states.borrow_and_update());
            print!("{}", instruction);
        }
    });

    println!(
        "Type to search ({} for popular searches, {} to quit).",
        TRENDING_COMMAND, QUIT_COMMAND
    );

    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = line?;
        let command = line.trim();
        if command == QUIT_COMMAND {
            break;
        } else if command == TRENDING_COMMAND {
            print_trending(&session, config.search.trending_limit).await;
        } else {
            session.set_query(line);
        }
    }

    session.shutdown().await;
    renderer.abort();
    Ok(())
}

async fn print_trending(session: &SearchSession, limit: usize) {
    let trending = project_trending(&session.trending(limit).await);
    if trending.is_empty() {
        return;
    }
    println!("Trending searches:");
    for entry in trending {
        println!("  {}", entry);
    }
}
