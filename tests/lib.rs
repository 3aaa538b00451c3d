//! Shared ISS fixtures and client builders for behaviour tests.

use std::sync::Arc;
use std::time::Duration;

use moextick_core::{ClientConfig, MoexClient, StubHttpClient};

pub const SHARE_SBER_PATH: &str = "/engines/stock/markets/shares/securities/SBER.json";
pub const BOND_FALLBACK_PATH: &str = "/engines/stock/markets/bonds/securities/RU000A105Q63.json";
pub const BOND_OFZ_PATH: &str = "/engines/stock/markets/bonds/securities/SU26238RMFS4.json";
pub const SEARCH_PATH: &str = "/securities.json";

pub const SHARE_SBER: &str = r#"{
    "securities": {
        "columns": ["SECID", "BOARDID", "SHORTNAME", "SECNAME", "ISIN", "PREVPRICE", "LOTSIZE",
                    "FACEVALUE", "CURRENCYID", "MINSTEP", "DECIMALS", "SETTLEDATE", "LISTLEVEL"],
        "data": [
            ["SBER", "SMAL", "Сбербанк", "Сбербанк России ПАО ао", "RU0009029540", 300.1, 1,
             3, "SUR", 0.01, 2, "2026-10-21", 1],
            ["SBER", "TQBR", "Сбербанк", "Сбербанк России ПАО ао", "RU0009029540", 300.0, 10,
             3, "SUR", 0.01, 2, "2026-10-21", 1]
        ]
    },
    "marketdata": {
        "columns": ["SECID", "BOARDID", "LAST", "WAPRICE", "OPEN", "HIGH", "LOW"],
        "data": [
            ["SBER", "SMAL", null, null, null, null, null],
            ["SBER", "TQBR", 312.5, 311.8, 310.0, 315.2, 309.4]
        ]
    }
}"#;

/// Listed on TQCB and SPOB, trading only on SPOB.
pub const BOND_FALLBACK: &str = r#"{
    "securities": {
        "columns": ["SECID", "BOARDID", "SHORTNAME", "FACEVALUE", "ACCRUEDINT", "PREVWAPRICE",
                    "PREVPRICE", "MATDATE", "NEXTCOUPON", "COUPONVALUE", "OFFERDATE"],
        "data": [
            ["RU000A105Q63", "TQCB", "Сегежа3P5R", 1000, 5.12, 70.1, 70.0, "2027-03-12",
             "2026-11-02", 14.71, "0000-00-00"],
            ["RU000A105Q63", "SPOB", "Сегежа3P5R", 1000, 5.12, 70.1, 70.0, "2027-03-12",
             "2026-11-02", 14.71, "0000-00-00"]
        ]
    },
    "marketdata": {
        "columns": ["SECID", "BOARDID", "LAST", "WAPRICE", "MARKETPRICE", "YIELD"],
        "data": [
            ["RU000A105Q63", "TQCB", null, null, null, null],
            ["RU000A105Q63", "SPOB", 68.5, 68.9, 69.0, 38.2]
        ]
    },
    "marketdata_yields": {
        "columns": ["SECID", "BOARDID", "EFFECTIVEYIELD"],
        "data": [
            ["RU000A105Q63", "TQCB", 37.1],
            ["RU000A105Q63", "SPOB", 39.4]
        ]
    }
}"#;

pub const BOND_OFZ: &str = r#"{
    "securities": {
        "columns": ["SECID", "BOARDID", "SHORTNAME", "ISIN", "FACEVALUE", "ACCRUEDINT",
                    "PREVWAPRICE", "YIELDATPREVWAPRICE", "MATDATE", "COUPONPERIOD", "FACEUNIT"],
        "data": [
            ["SU26238RMFS4", "TQOB", "ОФЗ 26238", "RU000A1038V6", 1000, "12,34", 58.1, 14.2,
             "2041-05-15", 182, "SUR"]
        ]
    },
    "marketdata": {
        "columns": ["SECID", "BOARDID", "LAST", "WAPRICE", "MARKETPRICE", "YIELD"],
        "data": [["SU26238RMFS4", "TQOB", null, null, null, null]]
    },
    "marketdata_yields": {"columns": ["SECID", "BOARDID", "EFFECTIVEYIELD"], "data": []}
}"#;

pub const EMPTY_SECURITIES: &str = r#"{
    "securities": {"columns": ["SECID", "BOARDID"], "data": []},
    "marketdata": {"columns": ["SECID", "BOARDID", "LAST"], "data": []}
}"#;

pub const SEARCH_SBERBANK: &str = r#"{
    "securities": {
        "columns": ["id", "secid", "shortname", "regnumber", "name", "isin", "is_traded",
                    "emitent_id", "emitent_title", "emitent_inn", "type", "group",
                    "primary_boardid", "marketprice_boardid"],
        "data": [
            [1, "SBER", "Sberbank", "10301481B", "Sberbank of Russia PJSC", "RU0009029540", 1,
             1199, "Sberbank PJSC", "7707083893", "common_share", "stock_shares", "TQBR", "TQBR"],
            [2, "SBERP", "Sberbank-p", "20301481B", "Sberbank of Russia PJSC pref", "RU0009029557", 1,
             1199, "Sberbank PJSC", "7707083893", "preferred_share", "stock_shares", "TQBR", "TQBR"],
            [3, "RU000A1002C2", "Sberbank 1P1", "4B020101481B", "Sberbank bond 1P1", "RU000A1002C2", 1,
             1199, "Sberbank PJSC", "7707083893", "exchange_bond", "stock_bonds", "TQCB", "TQCB"],
            [4, null, "broken row", null, null, null, 0,
             null, null, null, null, "stock_shares", null, null],
            [5, "SBGD", "Sberbank gold", null, "Sberbank gold fund", "RU000A1009P1", 1,
             null, null, null, "exchange_ppif", "stock_ppif", "TQTF", "TQTF"],
            [6, "SBER", "Sberbank", "10301481B", "Sberbank of Russia PJSC", "RU0009029540", 0,
             1199, "Sberbank PJSC", "7707083893", "common_share", "stock_shares", "SMAL", null]
        ]
    }
}"#;

/// Stub serving every fixture above.
pub fn iss_stub() -> StubHttpClient {
    StubHttpClient::new()
        .with_json(SHARE_SBER_PATH, SHARE_SBER)
        .with_json(BOND_FALLBACK_PATH, BOND_FALLBACK)
        .with_json(BOND_OFZ_PATH, BOND_OFZ)
        .with_json(SEARCH_PATH, SEARCH_SBERBANK)
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default().with_base_url("https://iss.test/iss")
}

pub fn client_with(stub: StubHttpClient, config: ClientConfig) -> (Arc<StubHttpClient>, MoexClient) {
    let stub = Arc::new(stub);
    let client = MoexClient::with_http_client(config, stub.clone());
    (stub, client)
}

pub fn client(stub: StubHttpClient) -> (Arc<StubHttpClient>, MoexClient) {
    client_with(stub, test_config())
}

/// Stub whose every response takes `latency`, so concurrent callers overlap.
pub fn slow_iss_stub(latency: Duration) -> StubHttpClient {
    iss_stub().with_latency(latency)
}
