use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use cinema_spider::pipeline::collect_movies;
use cinema_spider::report::{rank, render_report};
use cinema_spider::requester::{RequestConfig, RequestHandler};

/// Obtain the list of today's movies with the greatest rating.
#[derive(Debug, Parser)]
#[command(name = "cinema-spider", version)]
struct Args {
    /// Movies count for console output
    #[arg(long = "movies_count", default_value_t = 10)]
    movies_count: usize,

    /// The lower bound for the cinemas count
    #[arg(long = "cinemas_count_limit", default_value_t = 1)]
    cinemas_count_limit: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let handler = RequestHandler::new(RequestConfig::default());
    let mut rng = rand::thread_rng();

    let records = collect_movies(&handler, &mut rng)?;
    let ranked = rank(records);

    info!(
        "Movies with the greatest rating (cinemas count >= {}):",
        args.cinemas_count_limit
    );
    for line in render_report(&ranked, args.movies_count, args.cinemas_count_limit) {
        println!("{line}");
    }

    Ok(())
}
