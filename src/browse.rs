use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::feed::{FeedController, FetchOutcome, MovieLookup};
use crate::filters::{catalog, FilterState, FilterStore};
use crate::gateway::{HttpMovieGateway, Movie, MovieGateway};
use crate::scroll::{ScrollEvents, ScrollMetrics, ScrollProximityTrigger};
use crate::AppError;

/// Scroll units per printed row. Thresholds in the config use the same units.
const ROW_UNITS: f64 = 20.0;

#[derive(Debug, Clone)]
pub enum Command {
    Browse { filters: FilterState, screens: u32 },
    Movie { id: String, certification: Option<String> },
    Catalog,
}

pub async fn run(config: Config, command: Command) -> Result<(), AppError> {
    if config.debug_logs {
        info!("Debug logging enabled");
    }

    match command {
        Command::Catalog => {
            print_catalog();
            Ok(())
        }
        Command::Browse { filters, screens } => {
            let gateway = gateway(&config)?;
            browse(&config, gateway, filters, screens).await
        }
        Command::Movie { id, certification } => {
            let gateway = gateway(&config)?;
            show_movie(&config, gateway, &id, certification).await
        }
    }
}

fn gateway(config: &Config) -> Result<Arc<dyn MovieGateway>, AppError> {
    info!("Using movie service at {}", config.api.base_url);
    Ok(Arc::new(HttpMovieGateway::from_config(&config.api)?))
}

fn print_catalog() {
    println!("Genres:");
    for genre in catalog::GENRES {
        println!("  {}", genre);
    }
    println!("Certifications:");
    for cert in catalog::CERTIFICATIONS {
        println!("  {}", cert);
    }
}

fn format_row(movie: &Movie) -> String {
    format!(
        "{:>4}  {:<40} [{}] {}",
        movie.year,
        movie.title,
        movie.certification,
        movie.genres.join(", ")
    )
}

fn warn_unknown_filters(filters: &FilterState) {
    for genre in filters.genres() {
        if !catalog::is_known_genre(genre) {
            warn!("Genre {:?} is not in the catalog, passing it through", genre);
        }
    }
    if let Some(cert) = filters.certification() {
        if !catalog::is_known_certification(cert) {
            warn!("Certification {:?} is not in the catalog, passing it through", cert);
        }
    }
}

/// Print the feed for `filters`, scrolling one viewport at a time and letting
/// the proximity trigger request pages.
pub async fn browse(
    config: &Config,
    gateway: Arc<dyn MovieGateway>,
    filters: FilterState,
    screens: u32,
) -> Result<(), AppError> {
    warn_unknown_filters(&filters);

    let store = FilterStore::new();
    store.set(filters);
    let feed = Arc::new(FeedController::new(gateway, store.get(), config.feed.max_pages));

    let events = ScrollEvents::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _trigger = ScrollProximityTrigger::attach(&events, f64::from(config.scroll.threshold), move || {
        let _ = tx.send(());
    });

    let mut printed = 0;
    let mut last_error = None;

    if let Err(e) = feed.fetch_next().await {
        warn!("Failed to load first page: {}", e);
        last_error = Some(e);
    }
    printed += print_new(&feed, printed);

    let viewport = f64::from(config.scroll.viewport) * ROW_UNITS;
    let mut scroll_y = 0.0;

    for _ in 0..screens {
        let document_height = printed as f64 * ROW_UNITS;
        if !feed.has_more() && scroll_y + viewport >= document_height {
            break;
        }
        scroll_y = (scroll_y + viewport).min((document_height - viewport).max(0.0));
        events.emit(ScrollMetrics {
            viewport_height: viewport,
            scroll_y,
            document_height,
        });

        // Every trigger starts a fetch; the controller turns the extras into no-ops.
        let mut pending = Vec::new();
        while rx.try_recv().is_ok() {
            let feed = feed.clone();
            pending.push(tokio::spawn(async move { feed.fetch_next().await }));
        }
        for handle in pending {
            match handle.await {
                Ok(Ok(FetchOutcome::Exhausted)) => info!("Reached the end of the feed"),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    warn!("Failed to load next page, will retry on scroll: {}", e);
                    last_error = Some(e);
                }
                Err(e) => warn!("Fetch task failed: {}", e),
            }
        }
        printed += print_new(&feed, printed);
    }

    let snapshot = feed.snapshot();
    info!(
        pages = snapshot.page_count,
        movies = snapshot.movie_count,
        has_more = snapshot.has_more,
        "Browse finished"
    );

    match (snapshot.movie_count, last_error) {
        (0, Some(e)) => Err(e.into()),
        _ => Ok(()),
    }
}

fn print_new(feed: &FeedController, printed: usize) -> usize {
    let movies = feed.flattened();
    let fresh = movies.get(printed..).unwrap_or_default();
    for movie in fresh {
        println!("{}", format_row(movie));
    }
    fresh.len()
}

pub async fn show_movie(
    config: &Config,
    gateway: Arc<dyn MovieGateway>,
    id: &str,
    certification: Option<String>,
) -> Result<(), AppError> {
    let store = FilterStore::new();
    store.set(FilterState::default().with_certification(certification.as_deref()));

    let lookup = MovieLookup::new(gateway);
    let rec = lookup.get_for_filters(id, &store).await?;
    let movie = &rec.searched_movie;

    println!("{} ({})  [{}]", movie.title, movie.year, movie.certification);
    if !movie.genres.is_empty() {
        println!("{}", movie.genres.join(", "));
    }
    if let Some(url) = movie.backdrop_url(&config.images.base_url) {
        println!("{}", url);
    }
    if let Some(overview) = &movie.overview {
        println!();
        println!("{}", overview);
    }

    if !rec.results.is_empty() {
        println!();
        println!("Recommended:");
        for scored in &rec.results {
            println!("  {:.2}  {}", scored.similarity_score, format_row(&scored.movie));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::controller::tests::{movie, ScriptedGateway};

    #[tokio::test]
    async fn test_browse_scrolls_through_feed() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok((0..20).map(|i| movie(&format!("a{}", i))).collect()),
            Ok((0..20).map(|i| movie(&format!("b{}", i))).collect()),
            Ok(vec![]),
        ]));
        let mut config = Config::default();
        config.scroll.viewport = 10;

        browse(&config, gateway.clone(), FilterState::default(), 20)
            .await
            .unwrap();

        let pages: Vec<u32> = gateway.calls().into_iter().map(|(page, _)| page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_browse_respects_screen_limit() {
        let gateway = Arc::new(ScriptedGateway::new(
            (0..10)
                .map(|p| Ok((0..20).map(|i| movie(&format!("{}-{}", p, i))).collect()))
                .collect(),
        ));
        let mut config = Config::default();
        config.scroll.viewport = 20;
        config.scroll.threshold = 0;

        browse(&config, gateway.clone(), FilterState::default(), 1)
            .await
            .unwrap();

        // The first page plus at most one triggered by the single scroll.
        assert!(gateway.calls().len() <= 2);
    }

    #[tokio::test]
    async fn test_run_catalog_with_debug_logs() {
        let mut config = Config::default();
        assert!(!config.debug_logs);
        config.debug_logs = true;
        run(config, Command::Catalog).await.unwrap();
    }

    #[test]
    fn test_format_row() {
        let mut m = movie("1");
        m.genres = vec!["Drama".into(), "Crimen".into()];
        let row = format_row(&m);
        assert!(row.starts_with("2000  Movie 1"));
        assert!(row.ends_with("[PG] Drama, Crimen"));
    }
}
