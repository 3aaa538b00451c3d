use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::domain::{InstrumentType, SearchResult};
use crate::session::IssSession;
use crate::{endpoints, MoexError, ValidationError};

/// Upper bound on results returned by one search.
pub const MAX_RESULTS: usize = 20;

const EXACT: u32 = 3;
const PREFIX: u32 = 2;
const SUBSTRING: u32 = 1;

const SECID_WEIGHT: u32 = 100;
const ISIN_WEIGHT: u32 = 80;
const SHORTNAME_WEIGHT: u32 = 40;
const NAME_WEIGHT: u32 = 10;
const TRADED_BONUS: u32 = 5;

/// Normalized search request: trimmed, lower-cased text plus optional type
/// filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    instrument_type: Option<InstrumentType>,
}

impl SearchQuery {
    pub fn new(text: &str, instrument_type: Option<&str>) -> Result<Self, ValidationError> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        let instrument_type = instrument_type.map(str::parse).transpose()?;
        Ok(Self {
            text,
            instrument_type,
        })
    }

    pub fn with_type(text: &str, instrument_type: InstrumentType) -> Result<Self, ValidationError> {
        let mut query = Self::new(text, None)?;
        query.instrument_type = Some(instrument_type);
        Ok(query)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn instrument_type(&self) -> Option<InstrumentType> {
        self.instrument_type
    }

    /// `search:{text}:{type or "all"}`, so differently filtered searches for
    /// the same text never share an entry.
    pub fn cache_key(&self) -> String {
        format!(
            "search:{}:{}",
            self.text,
            self.instrument_type.map_or("all", InstrumentType::as_str)
        )
    }
}

/// Cached instrument search over `/securities.json`.
pub struct SearchService {
    session: Arc<IssSession>,
    cache: Arc<dyn Cache<Arc<Vec<SearchResult>>>>,
}

impl SearchService {
    pub fn new(session: Arc<IssSession>, cache: Arc<dyn Cache<Arc<Vec<SearchResult>>>>) -> Self {
        Self { session, cache }
    }

    /// # Errors
    ///
    /// `Validation` for blank text or an unknown type, raised before the
    /// cache is consulted; `Upstream`/`Decode` from the fetch.
    pub async fn find(
        &self,
        text: &str,
        instrument_type: Option<&str>,
    ) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        let query = SearchQuery::new(text, instrument_type)?;
        self.find_query(query).await
    }

    pub async fn find_query(&self, query: SearchQuery) -> Result<Arc<Vec<SearchResult>>, MoexError> {
        let key = query.cache_key();
        let loader = load_search(Arc::clone(&self.session), query).boxed();
        self.cache.get_or_set(&key, loader, None).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

async fn load_search(
    session: Arc<IssSession>,
    query: SearchQuery,
) -> Result<Arc<Vec<SearchResult>>, MoexError> {
    let limit = endpoints::SEARCH_LIMIT.to_string();
    let document = session
        .get(endpoints::SEARCH, &[("q", query.text()), ("limit", limit.as_str())])
        .await?;

    let rows = document.table("securities")?.rows();
    let total = rows.len();
    let candidates = rows
        .iter()
        .filter_map(|row| match SearchResult::from_row(row) {
            Ok(result) => Some(result),
            Err(error) => {
                warn!(query = query.text(), error = %error, "skipping malformed search row");
                None
            }
        })
        .filter(|result| match (query.instrument_type(), result.group.as_deref()) {
            (None, _) => true,
            (Some(instrument_type), Some(group)) => instrument_type.matches_group(group),
            (Some(_), None) => false,
        })
        .collect::<Vec<_>>();

    let results = rank(candidates, query.text());
    debug!(
        query = query.text(),
        rows = total,
        results = results.len(),
        "search loaded"
    );
    Ok(Arc::new(results))
}

/// Scores `candidates` against the normalized `query`, drops non-matches,
/// orders by score (stable), keeps the first hit per `secid` and truncates
/// to [`MAX_RESULTS`].
pub fn rank(candidates: Vec<SearchResult>, query: &str) -> Vec<SearchResult> {
    let mut scored = candidates
        .into_iter()
        .map(|result| (score(&result, query), result))
        .filter(|(points, _)| *points > 0)
        .collect::<Vec<_>>();
    scored.sort_by_key(|(points, _)| Reverse(*points));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .map(|(_, result)| result)
        .filter(|result| seen.insert(result.secid.clone()))
        .take(MAX_RESULTS)
        .collect()
}

pub fn score(result: &SearchResult, query: &str) -> u32 {
    let base = match_score(Some(result.secid.as_str()), query) * SECID_WEIGHT
        + match_score(result.isin.as_deref(), query) * ISIN_WEIGHT
        + match_score(Some(result.shortname.as_str()), query) * SHORTNAME_WEIGHT
        + match_score(result.name.as_deref(), query) * NAME_WEIGHT;

    if base > 0 && result.is_traded == Some(true) {
        base + TRADED_BONUS
    } else {
        base
    }
}

fn match_score(field: Option<&str>, query: &str) -> u32 {
    let Some(field) = field else {
        return 0;
    };
    let field = field.to_lowercase();
    if field == query {
        EXACT
    } else if field.starts_with(query) {
        PREFIX
    } else if field.contains(query) {
        SUBSTRING
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(secid: &str, shortname: &str, traded: bool) -> SearchResult {
        SearchResult {
            secid: secid.to_owned(),
            shortname: shortname.to_owned(),
            name: None,
            isin: None,
            regnumber: None,
            instrument_type: None,
            group: Some(String::from("stock_shares")),
            is_traded: Some(traded),
            primary_boardid: None,
            marketprice_boardid: None,
            emitent_id: None,
            emitent_title: None,
            emitent_inn: None,
        }
    }

    #[test]
    fn query_normalization_and_keys() {
        let query = SearchQuery::new("  Sberbank ", Some("Share")).expect("query");
        assert_eq!(query.text(), "sberbank");
        assert_eq!(query.cache_key(), "search:sberbank:share");
        assert_eq!(
            SearchQuery::new("sberbank", None).expect("query").cache_key(),
            "search:sberbank:all"
        );
    }

    #[test]
    fn invalid_queries_are_rejected() {
        assert_eq!(SearchQuery::new(" ", None), Err(ValidationError::EmptyQuery));
        assert!(matches!(
            SearchQuery::new("sber", Some("crypto")),
            Err(ValidationError::UnknownInstrumentType { .. })
        ));
    }

    #[test]
    fn exact_identifier_beats_prefix_and_substring() {
        let ranked = rank(
            vec![
                hit("XSBER", "Other", true),
                hit("SBERP", "Сбербанк-п", true),
                hit("SBER", "Сбербанк", true),
                hit("GAZP", "Газпром", true),
            ],
            "sber",
        );

        let ids = ranked.iter().map(|r| r.secid.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["SBER", "SBERP", "XSBER"]);
    }

    #[test]
    fn traded_bonus_breaks_ties_and_order_is_stable() {
        let ranked = rank(
            vec![
                hit("SBERA", "a", false),
                hit("SBERB", "b", true),
                hit("SBERC", "c", false),
            ],
            "sber",
        );

        let ids = ranked.iter().map(|r| r.secid.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["SBERB", "SBERA", "SBERC"]);
    }

    #[test]
    fn duplicates_collapse_and_results_are_capped() {
        let mut candidates = vec![hit("SBER", "first", true), hit("SBER", "second", true)];
        candidates.extend((0..30).map(|index| hit(&format!("SBER{index:02}"), "x", false)));

        let ranked = rank(candidates, "sber");

        assert_eq!(ranked.len(), MAX_RESULTS);
        assert_eq!(ranked[0].shortname, "first");
        assert_eq!(ranked.iter().filter(|r| r.secid == "SBER").count(), 1);
    }
}
