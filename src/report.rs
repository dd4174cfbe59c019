use std::cmp::Ordering;

use crate::models::MovieRecord;

/// Sorts descending by rating; titles without a parseable rating go after
/// every rated one. The sort is stable, so re-ranking is idempotent.
///
/// Ratings are compared numerically. The listing this replaces compared the
/// raw strings, which put "9.0" above "10"; that ordering was judged a bug
/// and fixed here rather than carried over.
pub fn rank(mut records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    records.sort_by(|a, b| match (a.rating_value(), b.rating_value()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    records
}

/// Renders the report lines: records below the cinema-count floor are
/// dropped first, then the first `movies_count` of what remains are printed
/// with a 1-based rank.
pub fn render_report(
    records: &[MovieRecord],
    movies_count: usize,
    cinemas_count_limit: usize,
) -> Vec<String> {
    records
        .iter()
        .filter(|movie| movie.cinema_count >= cinemas_count_limit)
        .take(movies_count)
        .enumerate()
        .map(|(num, movie)| {
            format!(
                "{} \"{}\" (RATING: {}; RATING COUNT: {}; CINEMAS COUNT: {})",
                num + 1,
                movie.title,
                movie.rating.as_deref().unwrap_or("None"),
                movie.rating_count.as_deref().unwrap_or("None"),
                movie.cinema_count,
            )
        })
        .collect()
}
