use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RatingInfo
// ---------------------------------------------------------------------------

/// Rating and vote count scraped from a rating-source result page.
///
/// Both fields come from the same page; a page that yields one marker but not
/// the other is treated as having no rating at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingInfo {
    pub rating: String,
    pub rating_count: String,
}

// ---------------------------------------------------------------------------
// MovieRecord
// ---------------------------------------------------------------------------

/// One movie from today's schedule, merged with its rating lookup result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub cinema_count: usize,
    pub rating: Option<String>,
    pub rating_count: Option<String>,
}

impl MovieRecord {
    pub fn new(title: String, cinema_count: usize, rating_info: Option<RatingInfo>) -> Self {
        let (rating, rating_count) = match rating_info {
            Some(info) => (Some(info.rating), Some(info.rating_count)),
            None => (None, None),
        };
        Self {
            title,
            cinema_count,
            rating,
            rating_count,
        }
    }

    /// Numeric sort key. `None` for missing or unparseable ratings, which
    /// rank below every parsed value.
    ///
    /// A decimal comma ("8,1") is accepted; a thousands separator ("1,234")
    /// is not, since reading it as a decimal point would shift the value.
    pub fn rating_value(&self) -> Option<f64> {
        let raw = self.rating.as_deref()?.trim();
        if let Ok(value) = raw.parse::<f64>() {
            return Some(value);
        }
        match raw.split_once(',') {
            Some((head, tail))
                if (1..=2).contains(&tail.len())
                    && tail.bytes().all(|b| b.is_ascii_digit()) =>
            {
                format!("{head}.{tail}").parse::<f64>().ok()
            }
            _ => None,
        }
    }
}
