//! Exchange API: request signing, wire types, and the REST client.

mod futures_client;
mod signer;
mod types;

pub use futures_client::{Credentials, FuturesClient};
pub use signer::RequestSigner;
pub use types::{ApiErrorBody, FuturesBalance, LongShortRatio, PremiumIndex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::BotResult;

/// Read-only market data the trading logic consumes.
///
/// Implemented by [`FuturesClient`]; test code can substitute canned values
/// without touching the network.
#[async_trait]
pub trait MarketData {
    /// Exchange-computed fair reference price for the symbol.
    async fn mark_price(&self, symbol: &str) -> BotResult<Decimal>;

    /// Top-trader long/short position ratio over the given period (e.g. "5m").
    async fn top_long_short_ratio(&self, symbol: &str, period: &str) -> BotResult<Decimal>;
}

/// Account state reads.
#[async_trait]
pub trait AccountData {
    /// Margin balance available for new positions, in the given asset.
    async fn available_balance(&self, asset: &str) -> BotResult<Decimal>;
}
