use chrono::NaiveDate;
use postsearch::{
    DateRange, MemoryStore, Query, SearchEngine, SearchSession, SortMode, UrlState,
};

fn main() -> anyhow::Result<()> {
    println!("=== postsearch Basic Usage Example ===\n");

    let engine = SearchEngine::builtin()?;
    let today = NaiveDate::from_ymd_opt(2024, 10, 12).unwrap_or_default();
    println!("Loaded {} posts\n", engine.corpus().len());

    // Example 1: Relevance search
    println!("--- Example 1: Search for 'ethereum' ---");
    let results = engine.search_at(&Query::new("ethereum"), today);
    println!("Found {} posts", results.total_matches);
    for scored in &results.results {
        let label = if scored.is_best_match(engine.config().best_match_threshold) {
            " (best match)"
        } else {
            ""
        };
        println!("  [{:>3}] {}{}", scored.score, scored.document.title, label);
    }

    // Example 2: Category filter
    println!("\n--- Example 2: 'defi' within Staking ---");
    let results = engine.search_at(&Query::new("defi").category("Staking"), today);
    for scored in &results.results {
        let doc = scored.document;
        println!("  [{:>3}] {} ({})", scored.score, doc.title, doc.category);
    }

    // Example 3: Date window and date sort
    println!("\n--- Example 3: 'layer 2' from the past week, newest first ---");
    let query = Query::new("layer 2")
        .date_range(DateRange::PastWeek)
        .sort(SortMode::Date);
    for scored in &engine.search_at(&query, today).results {
        println!("  {} {}", scored.document.date, scored.document.title);
    }

    // Example 4: Pagination
    println!("\n--- Example 4: Pages of 6 for 'web3' ---");
    let page = engine.search_page_at(&Query::new("web3"), 1, today);
    println!("Page {}/{} ({} matches)", page.page, page.total_pages, page.total_matches);

    // Example 5: Listing view from a URL
    println!("\n--- Example 5: /blog?category=NFTs ---");
    let state = UrlState::parse("category=NFTs", engine.corpus());
    let listing = engine.browse(&state.to_listing_query());
    for post in &listing.posts {
        println!("  {}", post.title);
    }
    println!("Link back: {}", state.href("/blog"));

    // Example 6: Recent searches
    println!("\n--- Example 6: Recent searches ---");
    let store = MemoryStore::new();
    let mut session = SearchSession::restore(&store, engine.config().recent_capacity)?;
    for text in ["nft", "dao", "nft"] {
        session.set_text(text);
        session.commit(&store)?;
    }
    println!("{:?}", session.recent.entries());

    println!("\n=== Example Complete ===");

    Ok(())
}
