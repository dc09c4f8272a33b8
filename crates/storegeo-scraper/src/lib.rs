pub mod client;
pub mod error;
pub mod parse;
pub(crate) mod rate_limit;

pub use client::MarketIndexClient;
pub use error::ScraperError;
pub use parse::parse_market_index;
