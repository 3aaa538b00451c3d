use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use super::board::{live_row, select_board};
use crate::cache::Cache;
use crate::domain::{Bond, Ticker, BOND_PRICE_COLUMNS};
use crate::session::IssSession;
use crate::{endpoints, MoexError};

/// Cached bond lookups keyed by `bond:{TICKER}`. The ticker may be a
/// trading code or an ISIN.
pub struct BondsService {
    session: Arc<IssSession>,
    cache: Arc<dyn Cache<Arc<Bond>>>,
    boards: Arc<[String]>,
}

impl BondsService {
    pub fn new(
        session: Arc<IssSession>,
        cache: Arc<dyn Cache<Arc<Bond>>>,
        boards: Vec<String>,
    ) -> Self {
        Self {
            session,
            cache,
            boards: boards.into(),
        }
    }

    pub fn cache_key(ticker: &Ticker) -> String {
        format!("bond:{ticker}")
    }

    /// # Errors
    ///
    /// `Validation` for a blank ticker, `NotFound` when ISS has no reference
    /// row for it, `Upstream`/`Decode` from the fetch.
    pub async fn get_bond(&self, ticker: &str) -> Result<Arc<Bond>, MoexError> {
        let ticker = Ticker::parse(ticker)?;
        let key = Self::cache_key(&ticker);
        let loader = load_bond(Arc::clone(&self.session), ticker, Arc::clone(&self.boards)).boxed();
        self.cache.get_or_set(&key, loader, None).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

async fn load_bond(
    session: Arc<IssSession>,
    ticker: Ticker,
    boards: Arc<[String]>,
) -> Result<Arc<Bond>, MoexError> {
    let document = session.get(&endpoints::bond(ticker.as_str()), &[]).await?;
    let securities = document.table("securities")?.rows();
    let marketdata = document.table("marketdata")?.rows();
    let yields = document.table("marketdata_yields")?.rows();

    let security = select_board(&securities, &marketdata, &boards, BOND_PRICE_COLUMNS)
        .ok_or_else(|| MoexError::not_found(format!("bond {ticker} not found")))?;
    let board = security.board_id();
    let market = live_row(&marketdata, board.as_deref(), BOND_PRICE_COLUMNS);
    let yield_row = yields
        .iter()
        .find(|row| board.is_some() && row.board_id() == board)
        .or_else(|| yields.first());

    let bond = Bond::from_rows(security, market, yield_row)
        .map_err(|error| MoexError::decode(format!("bond {ticker}: {error}")))?;
    debug!(
        ticker = %ticker,
        board = bond.board_id.as_deref().unwrap_or("-"),
        "bond loaded"
    );
    Ok(Arc::new(bond))
}
