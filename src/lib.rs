pub mod models;
pub mod pipeline;
pub mod proxy;
pub mod report;
pub mod requester;
pub mod scraper;
