//! ISS paths, relative to the configured base URL.

const MARKETS: &str = "/engines/stock/markets";

/// Global instrument search.
pub const SEARCH: &str = "/securities.json";

/// Rows requested per search call.
pub const SEARCH_LIMIT: usize = 100;

/// Reference and market data of one share across its boards.
pub fn share(ticker: &str) -> String {
    format!(
        "{MARKETS}/shares/securities/{}.json",
        urlencoding::encode(ticker)
    )
}

/// Reference, market and yield data of one bond across its boards.
pub fn bond(ticker: &str) -> String {
    format!(
        "{MARKETS}/bonds/securities/{}.json",
        urlencoding::encode(ticker)
    )
}
