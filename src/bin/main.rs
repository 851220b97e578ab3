use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviefeed::config::Config;
use moviefeed::filters::FilterState;
use moviefeed::Command;

const DEFAULT_CONFIG: &str = "moviefeed.yaml";

#[derive(Parser, Debug)]
#[command(name = "moviefeed")]
#[command(about = "Browse a remote movie catalog from the terminal", long_about = None)]
struct Args {
    #[arg(short, long)]
    config: Option<String>,
    #[arg(long)]
    debug: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Scroll through the movie feed
    Browse {
        #[arg(short, long = "genre")]
        genres: Vec<String>,
        #[arg(long)]
        certification: Option<String>,
        /// Number of screens to scroll
        #[arg(short, long, default_value_t = 10)]
        screens: u32,
    },
    /// Show one movie and its recommendations
    Movie {
        id: String,
        #[arg(long)]
        certification: Option<String>,
    },
    /// List selectable genres and certifications
    Catalog,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "moviefeed=debug" } else { "moviefeed=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let loaded = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::from_file_or_default(DEFAULT_CONFIG),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_env();
    config.debug_logs = args.debug;

    let command = match args.command {
        Cmd::Browse {
            genres,
            certification,
            screens,
        } => Command::Browse {
            filters: FilterState::new(genres, certification),
            screens,
        },
        Cmd::Movie { id, certification } => Command::Movie { id, certification },
        Cmd::Catalog => Command::Catalog,
    };

    if let Err(e) = moviefeed::run(config, command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
