use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::CoinGeckoClient;
use config::CardConfig;
use models::{CardLayout, ChartProjection, Theme};
use services::ChartCard;
use utils::{format_usd, Align, Table};

/// Terminal rendition of the projection
fn projection_table(projection: &ChartProjection) -> Table {
    let mut table = Table::new(vec!["#", "Name", "Current price"])
        .align(0, Align::Right)
        .align(2, Align::Right);
    for (i, (name, price)) in projection.labels.iter().zip(&projection.values).enumerate() {
        table.add_row(vec![(i + 1).to_string(), name.clone(), format_usd(*price)]);
    }
    table
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let mut filter = EnvFilter::from_default_env();
    for directive in ["coin_price_card=debug", "hyper=warn", "reqwest=warn"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📊 Starting coin price card...");

    let config = match CardConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    let client = Arc::new(CoinGeckoClient::with_base_url(config.api_url.clone()));
    info!("Fetching markets from {}", client.base_url());
    let layout = CardLayout {
        chart_height: config.chart_height,
        ..CardLayout::default()
    };
    let mut card = ChartCard::new(Theme::for_mode(config.theme_mode)).with_layout(layout);

    card.mount(client);
    card.wait_for_fetch().await;

    info!("Card holds {} market records", card.record_count().await);
    let projection = card.projection().await;
    println!("{}", card.dataset_label().await);
    let table = projection_table(&projection);
    if table.is_empty() {
        println!("(no market data)");
    } else {
        println!("{}", table.render());
    }

    match card.render_to_file(&config.output, config.width).await {
        Ok(()) => info!("Chart written to {}", config.output.display()),
        Err(e) => error!("Failed to render chart: {}", e),
    }

    card.unmount();
}
