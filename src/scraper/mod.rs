pub mod common;
pub mod rating_parser;
pub mod schedule_parser;

pub use rating_parser::parse_rating_page;
pub use schedule_parser::{parse_schedule_page, ParseError};
