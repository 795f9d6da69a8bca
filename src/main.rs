use amazon_search_mcp::catalog::amazon::AmazonClient;
use amazon_search_mcp::catalog::{search_products, CatalogClient, SearchRequest, UnconfiguredCatalog};
use amazon_search_mcp::config::{load_app_config, AppConfig};
use amazon_search_mcp::mcp::serve_stdio;
use amazon_search_mcp::router::create_app_router;
use amazon_search_mcp::state::AppState;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "amazon-search-mcp", version, about = "MCP server for Amazon product search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve MCP over HTTP (default)
    Serve {
        /// Overrides MCP_BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Serve MCP over stdin/stdout
    Stdio,
    /// Run one search and print the normalized products as JSON
    Search {
        keywords: String,
        #[arg(long, default_value_t = 10)]
        count: i64,
        #[arg(long, default_value = "All")]
        search_index: String,
        #[arg(long, default_value = "Relevance")]
        sort_by: String,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        browse_node_id: Option<String>,
        /// Available or IncludeOutOfStock
        #[arg(long, default_value = "Available")]
        availability: String,
        /// Keep items that carry no EAN
        #[arg(long)]
        include_without_ean: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_app_config()?;

    // Logs go to stderr so the stdio transport keeps stdout clean.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::new(
        build_catalog(&config)?,
        Duration::from_secs(config.cache_ttl_secs),
    );

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind_addr);
            let app = create_app_router(Arc::new(state));

            tracing::info!(%addr, "server running");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Stdio => {
            tracing::info!("serving MCP over stdio");
            serve_stdio(&state).await?;
        }
        Command::Search {
            keywords,
            count,
            search_index,
            sort_by,
            min_price,
            max_price,
            browse_node_id,
            availability,
            include_without_ean,
        } => {
            let request: SearchRequest = serde_json::from_value(json!({
                "keywords": keywords,
                "item_count": count,
                "search_index": search_index,
                "sort_by": sort_by,
                "min_price": min_price,
                "max_price": max_price,
                "browse_node_id": browse_node_id,
                "availability": availability,
                "only_with_ean": !include_without_ean,
            }))?;
            let products = search_products(state.catalog.as_ref(), &request).await?;
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
    }

    Ok(())
}

/// Real PA-API client when credentials are present, otherwise a client
/// that fails every call so searches degrade to empty results.
fn build_catalog(config: &AppConfig) -> anyhow::Result<Arc<dyn CatalogClient>> {
    match config.amazon.credentials() {
        Ok(credentials) => {
            let client = AmazonClient::new(
                credentials,
                config.amazon.country,
                config.amazon.request_timeout_secs,
            )?;
            tracing::info!(country = ?config.amazon.country, "Amazon PA-API client initialized");
            Ok(Arc::new(client))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Amazon PA-API disabled");
            Ok(Arc::new(UnconfiguredCatalog::new(err.to_string())))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        return;
    }
    tracing::info!("received shutdown signal, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["amazon-search-mcp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn search_subcommand_parses_filters() {
        let cli = Cli::try_parse_from([
            "amazon-search-mcp",
            "search",
            "smart home",
            "--count",
            "3",
            "--min-price",
            "10",
            "--availability",
            "IncludeOutOfStock",
            "--include-without-ean",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Search {
                keywords,
                count,
                min_price,
                availability,
                include_without_ean,
                ..
            }) => {
                assert_eq!(keywords, "smart home");
                assert_eq!(count, 3);
                assert_eq!(min_price, Some(10.0));
                assert_eq!(availability, "IncludeOutOfStock");
                assert!(include_without_ean);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
