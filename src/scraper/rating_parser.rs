use log::debug;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::models::RatingInfo;
use crate::scraper::common::get_text_content;

static SEL_RATING: Lazy<Selector> = Lazy::new(|| Selector::parse("span.rating_ball").unwrap());
static SEL_RATING_COUNT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.ratingCount").unwrap());

/// Extracts the rating and vote count from a rating-source result page.
///
/// Missing markers are the normal outcome for titles the rating source does
/// not know, or for result layouts that vary; the caller records "no rating"
/// and moves on. This is deliberately lenient where the schedule parser is
/// strict.
pub fn parse_rating_page(html: &str) -> Option<RatingInfo> {
    let document = Html::parse_document(html);

    let rating = document
        .select(&SEL_RATING)
        .next()
        .map(|el| get_text_content(&el).trim().to_string())?;
    let rating_count = document
        .select(&SEL_RATING_COUNT)
        .next()
        .map(|el| get_text_content(&el).trim().to_string())?;

    debug!("Parsed rating {} ({} votes)", rating, rating_count);
    Some(RatingInfo {
        rating,
        rating_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating_page(rating: &str, count: &str) -> String {
        format!(
            "<html><body><div>\
             <span class=\"rating_ball\">{rating}</span>\
             <span class=\"ratingCount\">{count}</span>\
             </div></body></html>"
        )
    }

    #[test]
    fn test_parses_rating_and_count() {
        let info = parse_rating_page(&rating_page("8.1", "1000")).unwrap();
        assert_eq!(info.rating, "8.1");
        assert_eq!(info.rating_count, "1000");
    }

    #[test]
    fn test_no_result_page_yields_none() {
        assert_eq!(
            parse_rating_page("<html><body>nothing was found</body></html>"),
            None
        );
    }

    #[test]
    fn test_missing_count_marker_yields_none() {
        let html = "<html><body><span class=\"rating_ball\">8.1</span></body></html>";
        assert_eq!(parse_rating_page(html), None);
    }

    #[test]
    fn test_missing_rating_marker_yields_none() {
        let html = "<html><body><span class=\"ratingCount\">1000</span></body></html>";
        assert_eq!(parse_rating_page(html), None);
    }
}
