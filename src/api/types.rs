//! Wire types for the Binance USDT-M futures REST API.
//!
//! Binance serializes every numeric field as a JSON string, so the decimal
//! fields decode through `rust_decimal::serde::str`.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Entry from `/fapi/v1/premiumIndex`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub mark_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub index_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub last_funding_rate: Option<Decimal>,
    #[serde(default)]
    pub next_funding_time: i64,
    #[serde(default)]
    pub time: i64,
}

/// Entry from `/fapi/v2/balance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesBalance {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    /// Balance usable as margin for new positions
    #[serde(with = "rust_decimal::serde::str")]
    pub available_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub cross_un_pnl: Option<Decimal>,
}

/// Entry from `/futures/data/topLongShortPositionRatio`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongShortRatio {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub long_short_ratio: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub long_account: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub short_account: Option<Decimal>,
    pub timestamp: i64,
}

/// Error body the exchange returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i32,
    pub msg: String,
}
