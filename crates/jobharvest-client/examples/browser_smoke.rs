/// Smoke-test for `BrowserNavigator` + `SeekParser`.
///
/// Launches Chromium, loads the first results page of one query, and prints
/// the cards the parser finds on the rendered page.
///
/// Run with:
///   cargo run -p jobharvest-client --example browser_smoke --features browser
use jobharvest_client::{BrowserNavigator, SeekParser};
use jobharvest_core::{ListingParser, Navigator, ScrapeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let headless = std::env::var("HEADLESS").map_or(true, |v| v != "false");
    let config = ScrapeConfig::default();
    let url = config.results_url(&config.queries[0], 1);

    println!("Launching browser (headless: {headless})…");
    let nav = BrowserNavigator::launch(headless).await?;

    println!("Loading {url} …");
    let html = nav.navigate(&url).await?;
    let page = SeekParser::new()?.parse_results(&html)?;

    println!("{} bytes rendered, {} cards, next page: {}", html.len(), page.cards.len(), page.has_next);
    for card in page.cards.iter().take(5) {
        println!("  {} | {} | {}", card.title, card.company, card.posted_text);
    }
    Ok(())
}
