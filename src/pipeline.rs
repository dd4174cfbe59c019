use indexmap::IndexMap;
use log::info;
use rand::Rng;
use thiserror::Error;

use crate::models::MovieRecord;
use crate::proxy::pool::ProxyPool;
use crate::requester::handler::{FetchError, RequestHandler, Transport};
use crate::scraper::{parse_rating_page, parse_schedule_page, ParseError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Runs the whole aggregation: schedule fetch, proxy pool fetch, then one
/// rating lookup per title. Any unrecovered failure aborts the run; no
/// partial result is returned.
pub fn collect_movies<T: Transport, R: Rng + ?Sized>(
    handler: &RequestHandler<T>,
    rng: &mut R,
) -> Result<Vec<MovieRecord>, PipelineError> {
    info!("Obtaining the list of movies from the schedule source...");
    let schedule_html = handler.fetch_direct(&handler.config().schedule_url, &[])?;
    let schedule = parse_schedule_page(&schedule_html)?;
    info!("Found {} movies in today's schedule", schedule.len());

    let pool = fetch_proxy_pool(handler)?;

    enrich_schedule(handler, &pool, schedule, rng)
}

/// One-shot pool acquisition. An unreachable directory is fatal: the rating
/// source cannot be fetched without proxies to rotate through.
pub fn fetch_proxy_pool<T: Transport>(
    handler: &RequestHandler<T>,
) -> Result<ProxyPool, FetchError> {
    let body = handler.fetch_direct(
        &handler.config().proxy_directory_url,
        &[("anonymity", "true"), ("token", "demo")],
    )?;
    Ok(ProxyPool::from_directory_body(&body))
}

/// Sequential per-title enrichment, in schedule order. Each title's fetch
/// (including its internal retry loop) completes before the next begins.
fn enrich_schedule<T: Transport, R: Rng + ?Sized>(
    handler: &RequestHandler<T>,
    pool: &ProxyPool,
    schedule: IndexMap<String, usize>,
    rng: &mut R,
) -> Result<Vec<MovieRecord>, PipelineError> {
    let total = schedule.len();
    let mut records = Vec::with_capacity(total);

    for (num, (title, cinema_count)) in schedule.into_iter().enumerate() {
        info!("[{}/{}] Get \"{}\" page...", num + 1, total, title);
        let rating_html = handler.fetch_page(
            &handler.config().rating_url,
            &[("kp_query", title.as_str()), ("first", "yes")],
            pool,
            rng,
        )?;
        let rating_info = parse_rating_page(&rating_html);
        records.push(MovieRecord::new(title, cinema_count, rating_info));
    }

    Ok(records)
}
