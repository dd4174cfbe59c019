use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::scraper::common::get_text_content;

static SEL_MOVIE_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-disp-table").unwrap());
static SEL_TITLE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SEL_CINEMA_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.b-td-item").unwrap());

/// The schedule page layout is a hard external contract; when its markers go
/// missing there is nothing to report, so parsing fails instead of guessing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("schedule page structure mismatch: {0}")]
    StructureMismatch(&'static str),
}

/// Extracts `title -> cinema count` from the schedule page, in page order.
/// A duplicated title overwrites its earlier count but keeps its position.
pub fn parse_schedule_page(html: &str) -> Result<IndexMap<String, usize>, ParseError> {
    let document = Html::parse_document(html);

    let blocks: Vec<ElementRef> = document.select(&SEL_MOVIE_BLOCK).collect();
    if blocks.is_empty() {
        return Err(ParseError::StructureMismatch("no movie blocks found"));
    }

    let mut schedule = IndexMap::new();
    for block in blocks {
        let title_link = block
            .select(&SEL_TITLE_LINK)
            .next()
            .ok_or(ParseError::StructureMismatch("movie block without a title link"))?;
        let title = get_text_content(&title_link).trim().to_string();

        // The cinema cells are siblings of the cell wrapping the title
        // block, so the count has to come from the enclosing row.
        let cinema_count = block
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tr")
            .map_or(0, |row| row.select(&SEL_CINEMA_CELL).count());

        schedule.insert(title, cinema_count);
    }

    debug!("Parsed {} schedule entries", schedule.len());
    Ok(schedule)
}
