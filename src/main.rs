use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use postsearch::api::{create_router, AppState};
use postsearch::config::Settings;
use postsearch::{DateRange, ListingQuery, Query, SearchEngine, SearchSession, SortMode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Search and browse blog posts", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank posts against a free-text query
    Search {
        query: String,
        #[arg(short, long)]
        category: Option<String>,
        /// all, week, month or year
        #[arg(short, long, default_value = "all")]
        date_range: String,
        /// relevance or date
        #[arg(short, long, default_value = "relevance")]
        sort: String,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Browse posts the way the listing page does
    List {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Print one post by slug
    Show { slug: String },
    /// List the categories present in the corpus
    Categories,
    /// Show or clear recent searches
    Recent {
        #[arg(long)]
        clear: bool,
    },
    /// Serve the JSON API
    Serve {
        #[arg(short, long, env = "POSTSEARCH_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postsearch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    let start = Instant::now();
    let corpus = settings.load_corpus()?;
    tracing::debug!("Corpus of {} posts ready in {:?}", corpus.len(), start.elapsed());
    let engine = Arc::new(SearchEngine::new(corpus, settings.engine_config()));

    match cli.command {
        Command::Search {
            query,
            category,
            date_range,
            sort,
            page,
        } => {
            let mut query = Query::new(&query)
                .date_range(DateRange::parse(&date_range))
                .sort(SortMode::parse(&sort));
            query.category = category;
            do_search(&engine, &settings, query, page)?;
        }
        Command::List { category, search, page } => {
            let listing = engine.browse(&ListingQuery { category, search, page });
            println!(
                "Showing {} of {} posts (page {}/{})",
                listing.posts.len(),
                listing.total,
                listing.page,
                listing.total_pages
            );
            println!();
            for post in listing.posts {
                println!("{}\t{}\t{}\t{}", post.id, post.date, post.category, post.title);
            }
        }
        Command::Show { slug } => {
            let post = engine
                .corpus()
                .find_by_slug(&slug)
                .with_context(|| format!("No post with slug '{}'", slug))?;
            println!("{}", serde_json::to_string_pretty(post)?);
        }
        Command::Categories => {
            for category in engine.corpus().categories() {
                println!("{}", category);
            }
        }
        Command::Recent { clear } => {
            let store = settings.open_store()?;
            let mut session = SearchSession::restore(&store, settings.recent_capacity)?;
            if clear {
                session.clear_history(&store)?;
                println!("Recent searches cleared");
            } else {
                for term in session.recent.entries() {
                    println!("{}", term);
                }
            }
        }
        Command::Serve { bind } => {
            let store = Arc::new(settings.open_store()?);
            let app = create_router(AppState::new(engine, store));

            tracing::info!("Listening on {}", bind);
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {}", bind))?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

// Perform search, display results and remember the query
fn do_search(engine: &SearchEngine, settings: &Settings, query: Query, page: usize) -> Result<()> {
    let start = Instant::now();
    let result = engine.search(&query);
    let duration = start.elapsed();

    println!("Search found {} posts in {:?}", result.total_matches, duration);
    println!();

    let threshold = engine.config().best_match_threshold;
    for scored in result.page(page, engine.config().page_size) {
        let label = if scored.is_best_match(threshold) { "  [best match]" } else { "" };
        println!(
            "{}\t{}\t{}\t{}{}",
            scored.score,
            scored.document.date,
            scored.document.category,
            scored.document.title,
            label
        );
    }

    if !query.is_blank() {
        let store = settings.open_store()?;
        let mut session = SearchSession::restore(&store, settings.recent_capacity)?;
        session.query = query;
        session.commit(&store)?;
    }

    Ok(())
}
