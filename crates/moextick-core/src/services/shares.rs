use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use super::board::{live_row, select_board};
use crate::cache::Cache;
use crate::domain::{Share, Ticker, SHARE_PRICE_COLUMNS};
use crate::session::IssSession;
use crate::{endpoints, MoexError};

/// Cached share lookups keyed by `share:{TICKER}`.
pub struct SharesService {
    session: Arc<IssSession>,
    cache: Arc<dyn Cache<Arc<Share>>>,
    boards: Arc<[String]>,
}

impl SharesService {
    pub fn new(
        session: Arc<IssSession>,
        cache: Arc<dyn Cache<Arc<Share>>>,
        boards: Vec<String>,
    ) -> Self {
        Self {
            session,
            cache,
            boards: boards.into(),
        }
    }

    pub fn cache_key(ticker: &Ticker) -> String {
        format!("share:{ticker}")
    }

    /// # Errors
    ///
    /// `Validation` for a blank ticker, `NotFound` when ISS has no reference
    /// row for it, `Upstream`/`Decode` from the fetch.
    pub async fn get_share(&self, ticker: &str) -> Result<Arc<Share>, MoexError> {
        let ticker = Ticker::parse(ticker)?;
        let key = Self::cache_key(&ticker);
        let loader = load_share(Arc::clone(&self.session), ticker, Arc::clone(&self.boards)).boxed();
        self.cache.get_or_set(&key, loader, None).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

async fn load_share(
    session: Arc<IssSession>,
    ticker: Ticker,
    boards: Arc<[String]>,
) -> Result<Arc<Share>, MoexError> {
    let document = session.get(&endpoints::share(ticker.as_str()), &[]).await?;
    let securities = document.table("securities")?.rows();
    let marketdata = document.table("marketdata")?.rows();

    let security = select_board(&securities, &marketdata, &boards, SHARE_PRICE_COLUMNS)
        .ok_or_else(|| MoexError::not_found(format!("share {ticker} not found")))?;
    let market = live_row(
        &marketdata,
        security.board_id().as_deref(),
        SHARE_PRICE_COLUMNS,
    );

    let share = Share::from_rows(security, market)
        .map_err(|error| MoexError::decode(format!("share {ticker}: {error}")))?;
    debug!(
        ticker = %ticker,
        board = share.board_id.as_deref().unwrap_or("-"),
        "share loaded"
    );
    Ok(Arc::new(share))
}
